//! Attempt telemetry collector.
//!
//! The collector keeps a bounded history of attempt events plus an async
//! broadcast stream, and counts outcomes for diagnostics.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::broadcast;

pub mod events;

pub use events::AttemptEvent;

/// Snapshot of collector state for HTTP/CLI reporting.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TelemetrySnapshot {
    pub recent: Vec<AttemptEvent>,
    pub total_events: u64,
    pub dropped_events: u64,
    pub completed_attempts: u64,
    pub failed_attempts: u64,
    pub stale_results_discarded: u64,
}

/// Broadcast-based collector retaining a bounded history of attempt events.
pub struct TelemetryCollector {
    tx: broadcast::Sender<AttemptEvent>,
    history: Mutex<VecDeque<AttemptEvent>>,
    history_capacity: usize,
    total_events: AtomicU64,
    dropped_history: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    stale: AtomicU64,
}

impl TelemetryCollector {
    pub fn new(buffer: usize, history_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self {
            tx,
            history: Mutex::new(VecDeque::with_capacity(history_capacity)),
            history_capacity,
            total_events: AtomicU64::new(0),
            dropped_history: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            stale: AtomicU64::new(0),
        }
    }

    pub fn publish(&self, event: AttemptEvent) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        match event {
            AttemptEvent::Completed { .. } => {
                self.completed.fetch_add(1, Ordering::Relaxed);
            }
            AttemptEvent::Failed { .. } => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
            AttemptEvent::StaleResultDiscarded { .. } => {
                self.stale.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }

        if let Ok(mut history) = self.history.lock() {
            if history.len() == self.history_capacity {
                history.pop_front();
                self.dropped_history.fetch_add(1, Ordering::Relaxed);
            }
            history.push_back(event.clone());
        }

        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AttemptEvent> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let recent = self
            .history
            .lock()
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default();
        TelemetrySnapshot {
            recent,
            total_events: self.total_events.load(Ordering::Relaxed),
            dropped_events: self.dropped_history.load(Ordering::Relaxed),
            completed_attempts: self.completed.load(Ordering::Relaxed),
            failed_attempts: self.failed.load(Ordering::Relaxed),
            stale_results_discarded: self.stale.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new(256, 64)
    }
}
