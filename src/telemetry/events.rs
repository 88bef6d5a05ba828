//! Attempt telemetry event types exposed to the CLI and debug HTTP surfaces.

use serde::{Deserialize, Serialize};

use crate::scoring::ScoreBand;
use crate::speech::PermissionDecision;

/// Lifecycle events for one assessment attempt, tagged with its generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum AttemptEvent {
    Started {
        generation: u64,
        language: String,
        word_count: usize,
    },
    PermissionResolved {
        generation: u64,
        decision: PermissionDecision,
    },
    CaptureFinished {
        generation: u64,
        elapsed_ms: u64,
    },
    Completed {
        generation: u64,
        overall_score: f64,
        band: ScoreBand,
        elapsed_ms: u64,
    },
    Failed {
        generation: u64,
        reason: String,
    },
    Reset {
        generation: u64,
    },
    StaleResultDiscarded {
        generation: u64,
        current_generation: u64,
    },
}

impl AttemptEvent {
    pub fn generation(&self) -> u64 {
        match self {
            AttemptEvent::Started { generation, .. }
            | AttemptEvent::PermissionResolved { generation, .. }
            | AttemptEvent::CaptureFinished { generation, .. }
            | AttemptEvent::Completed { generation, .. }
            | AttemptEvent::Failed { generation, .. }
            | AttemptEvent::Reset { generation }
            | AttemptEvent::StaleResultDiscarded { generation, .. } => *generation,
        }
    }
}
