use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::extract::{Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, SessionError};
use crate::session::{PracticeSessionController, SessionSnapshot};
use crate::telemetry::TelemetrySnapshot;

use super::sse;

const DEBUG_TOKEN_HEADER: &str = "x-debug-token";

/// Controller handle plus the token every request must present.
#[derive(Clone)]
pub struct DebugHttpState {
    controller: Arc<PracticeSessionController>,
    token: Arc<str>,
    started: Instant,
}

impl DebugHttpState {
    pub fn new(controller: Arc<PracticeSessionController>, token: String) -> Self {
        Self {
            controller,
            token: token.into(),
            started: Instant::now(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct AuthQuery {
    token: Option<String>,
}

/// JSON error body: `{ "error": message, "code": session error code }`.
#[derive(Debug)]
pub struct DebugHttpError {
    status: StatusCode,
    message: String,
    code: Option<i32>,
}

impl DebugHttpError {
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "missing or invalid token".to_string(),
            code: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for DebugHttpError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message, "code": self.code });
        (self.status, Json(body)).into_response()
    }
}

impl From<SessionError> for DebugHttpError {
    fn from(err: SessionError) -> Self {
        let status = match err {
            SessionError::AlreadyInProgress => StatusCode::CONFLICT,
            SessionError::StatePoisoned | SessionError::RuntimeUnavailable => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.message(),
            code: Some(err.code()),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    session_state: &'static str,
    generation: u64,
    uptime_ms: u64,
}

#[derive(Debug, Serialize)]
struct StartAck {
    generation: u64,
    session_state: &'static str,
}

/// Router for the debug surface; every route sits behind the token check.
pub fn build_router(state: DebugHttpState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session", get(current_session))
        .route("/session/start", post(start_session))
        .route("/session/reset", post(reset_session))
        .route("/session-stream", get(session_stream))
        .route("/telemetry", get(telemetry))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state)
}

pub(super) async fn run_http_server(state: DebugHttpState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding debug listener on {addr}"))?;
    axum::serve(listener, build_router(state))
        .await
        .context("serving debug router")
}

async fn require_token(
    State(state): State<DebugHttpState>,
    Query(query): Query<AuthQuery>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, DebugHttpError> {
    match presented_token(&headers, &query) {
        Some(token) if token == &*state.token => Ok(next.run(request).await),
        _ => Err(DebugHttpError::unauthorized()),
    }
}

/// Query string first, then `x-debug-token`, then a bearer header.
fn presented_token<'a>(headers: &'a HeaderMap, query: &'a AuthQuery) -> Option<&'a str> {
    let header = move |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
    query
        .token
        .as_deref()
        .or_else(|| header(DEBUG_TOKEN_HEADER))
        .or_else(|| header(AUTHORIZATION.as_str()).and_then(|raw| raw.strip_prefix("Bearer ")))
}

async fn health(State(state): State<DebugHttpState>) -> Result<Json<HealthResponse>, DebugHttpError> {
    let snapshot = state.controller.snapshot()?;
    Ok(Json(HealthResponse {
        status: "ok",
        session_state: snapshot.session.name(),
        generation: snapshot.generation,
        uptime_ms: state.started.elapsed().as_millis() as u64,
    }))
}

async fn current_session(
    State(state): State<DebugHttpState>,
) -> Result<Json<SessionSnapshot>, DebugHttpError> {
    Ok(Json(state.controller.snapshot()?))
}

async fn start_session(State(state): State<DebugHttpState>) -> Result<Json<StartAck>, DebugHttpError> {
    let token = state.controller.start_assessment()?;
    Ok(Json(StartAck {
        generation: token.generation(),
        session_state: state.controller.session_state()?.name(),
    }))
}

async fn reset_session(
    State(state): State<DebugHttpState>,
) -> Result<Json<SessionSnapshot>, DebugHttpError> {
    state.controller.reset_assessment()?;
    Ok(Json(state.controller.snapshot()?))
}

async fn telemetry(State(state): State<DebugHttpState>) -> Json<TelemetrySnapshot> {
    Json(state.controller.telemetry())
}

async fn session_stream(State(state): State<DebugHttpState>) -> sse::SessionStream {
    sse::session_snapshots(&state.controller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Method;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::session::SpeechCollaborators;
    use crate::speech::{LoggingSynthesizer, ScriptedAssessor, ScriptedOutcome, StaticPermission};

    const TOKEN: &str = "smoke-token";

    fn debug_router() -> (Router, Arc<PracticeSessionController>) {
        let collaborators = SpeechCollaborators {
            assessor: Arc::new(ScriptedAssessor::new(ScriptedOutcome::Synthesize)),
            permission: Arc::new(StaticPermission::granted()),
            synthesizer: Arc::new(LoggingSynthesizer::new()),
        };
        let controller = Arc::new(
            PracticeSessionController::new(&AppConfig::default(), collaborators)
                .expect("controller"),
        );
        let router = build_router(DebugHttpState::new(Arc::clone(&controller), TOKEN.into()));
        (router, controller)
    }

    async fn send(router: &Router, method: Method, uri: &str, header: Option<(&str, String)>) -> (StatusCode, Value) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        let response = router
            .clone()
            .oneshot(builder.body(Body::empty()).expect("request"))
            .await
            .expect("router call");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, json)
    }

    #[tokio::test]
    async fn rejects_missing_and_wrong_tokens() {
        let (router, _controller) = debug_router();

        let (status, json) = send(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "missing or invalid token");

        let (status, _) = send(&router, Method::GET, "/telemetry?token=nope", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accepts_query_header_and_bearer_tokens() {
        let (router, _controller) = debug_router();

        let (status, json) = send(&router, Method::GET, &format!("/health?token={TOKEN}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["session_state"], "idle");

        let header = Some((DEBUG_TOKEN_HEADER, TOKEN.to_string()));
        let (status, json) = send(&router, Method::GET, "/session", header).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["practice"]["mode"], "manual");

        let bearer = Some(("authorization", format!("Bearer {TOKEN}")));
        let (status, json) = send(&router, Method::GET, "/telemetry", bearer).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["completed_attempts"], 0);
    }

    #[tokio::test]
    async fn start_with_empty_text_reports_session_code() {
        let (router, _controller) = debug_router();
        let (status, json) = send(
            &router,
            Method::POST,
            &format!("/session/start?token={TOKEN}"),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], SessionError::EmptyReferenceText.message());
        assert_eq!(json["code"], SessionError::EmptyReferenceText.code());
    }

    #[tokio::test]
    async fn start_conflict_then_reset_bumps_generation() {
        let (router, controller) = debug_router();
        controller.set_reference_text("hello world").expect("text");
        let start = format!("/session/start?token={TOKEN}");

        let (status, json) = send(&router, Method::POST, &start, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["generation"], 1);
        assert_eq!(json["session_state"], "awaiting_permission");

        let (status, json) = send(&router, Method::POST, &start, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["code"], SessionError::AlreadyInProgress.code());

        let (status, json) = send(
            &router,
            Method::POST,
            &format!("/session/reset?token={TOKEN}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["session"]["state"], "idle");
        assert_eq!(json["generation"], 2);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found_without_auth() {
        let (router, _controller) = debug_router();
        let (status, _) = send(&router, Method::GET, "/metrics", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn session_errors_map_to_statuses() {
        assert_eq!(
            DebugHttpError::from(SessionError::AlreadyInProgress).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            DebugHttpError::from(SessionError::StatePoisoned).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DebugHttpError::from(SessionError::ReferenceTextLocked).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
