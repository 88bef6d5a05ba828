//! Debug HTTP surface for a running practice session.
//!
//! Compiled into debug builds with the `debug_http` feature only. Hosts call
//! [`spawn_if_enabled`] after building their controller; in every other build
//! the call logs and returns `None`.

#[cfg(all(feature = "debug_http", debug_assertions))]
mod routes;
#[cfg(all(feature = "debug_http", debug_assertions))]
mod sse;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::session::PracticeSessionController;

#[cfg(all(feature = "debug_http", debug_assertions))]
pub use routes::{build_router, DebugHttpError, DebugHttpState};

const ADDR_ENV: &str = "PRACTICE_DEBUG_HTTP_ADDR";
const TOKEN_ENV: &str = "PRACTICE_DEBUG_TOKEN";

/// Listener address and shared token for the debug server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugHttpConfig {
    pub addr: SocketAddr,
    pub token: String,
}

impl Default for DebugHttpConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8788)),
            token: "practice-debug".to_string(),
        }
    }
}

impl DebugHttpConfig {
    /// Defaults overridden by `PRACTICE_DEBUG_HTTP_ADDR` / `PRACTICE_DEBUG_TOKEN`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(ADDR_ENV) {
            match raw.parse() {
                Ok(addr) => config.addr = addr,
                Err(_) => log::warn!("[DebugHttp] Ignoring invalid {}={:?}", ADDR_ENV, raw),
            }
        }
        if let Some(token) = lookup(TOKEN_ENV).filter(|token| !token.is_empty()) {
            config.token = token;
        }
        config
    }

    fn token_preview(&self) -> String {
        self.token.chars().take(4).collect()
    }
}

/// Serve the debug router on the current Tokio runtime.
///
/// Returns `None` when no runtime is running. The server task holds a
/// controller reference until it is aborted or its runtime shuts down.
#[cfg(all(feature = "debug_http", debug_assertions))]
pub fn spawn_if_enabled(
    controller: Arc<PracticeSessionController>,
    config: DebugHttpConfig,
) -> Option<JoinHandle<()>> {
    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            log::error!("[DebugHttp] No Tokio runtime; debug server not started");
            return None;
        }
    };

    log::info!(
        "[DebugHttp] Binding {} (token prefix {}***)",
        config.addr,
        config.token_preview()
    );
    let addr = config.addr;
    let state = DebugHttpState::new(controller, config.token);
    Some(handle.spawn(async move {
        if let Err(err) = routes::run_http_server(state, addr).await {
            log::error!("[DebugHttp] Server stopped: {:#}", err);
        }
    }))
}

#[cfg(not(all(feature = "debug_http", debug_assertions)))]
pub fn spawn_if_enabled(
    _controller: Arc<PracticeSessionController>,
    config: DebugHttpConfig,
) -> Option<JoinHandle<()>> {
    log::debug!(
        "[DebugHttp] Not compiled in; ignoring request for {} (token prefix {}***)",
        config.addr,
        config.token_preview()
    );
    None
}
