//! Session lifecycle states and the transition table.
//!
//! `transition` is pure: it returns the next state for an event, or `None`
//! when the event does not apply in the current state (the caller treats
//! that as a no-op).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AssessmentError, AssessmentErrorKind, ErrorCode};
use crate::scoring::ScoreHierarchy;
use crate::speech::PermissionDecision;

/// Generation marker distinguishing the current attempt from superseded ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub u64);

impl SessionToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Why an attempt ended in `Failed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureReason {
    PermissionDenied,
    TransportOrService(String),
    NoResult,
}

impl FailureReason {
    /// Human-readable reason shown by the UI
    pub fn reason(&self) -> String {
        match self {
            FailureReason::PermissionDenied => "permission denied".to_string(),
            FailureReason::TransportOrService(message) => message.clone(),
            FailureReason::NoResult => "no pronunciation result".to_string(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason())
    }
}

impl From<&AssessmentError> for FailureReason {
    fn from(err: &AssessmentError) -> Self {
        match err.kind {
            AssessmentErrorKind::NoResult => FailureReason::NoResult,
            _ => FailureReason::TransportOrService(err.message()),
        }
    }
}

/// Assessment lifecycle; exactly one state is active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingPermission,
    /// Capturing speech; `elapsed_ms` grows with the recording timer
    Recording { elapsed_ms: u64 },
    /// Capture finished, waiting for scores; elapsed is frozen
    Assessing { elapsed_ms: u64 },
    Completed { scores: Arc<ScoreHierarchy> },
    Failed { reason: FailureReason },
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// Attempt started and not yet terminal
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            SessionState::AwaitingPermission
                | SessionState::Recording { .. }
                | SessionState::Assessing { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed { .. } | SessionState::Failed { .. }
        )
    }

    pub fn elapsed_ms(&self) -> u64 {
        match self {
            SessionState::Recording { elapsed_ms } | SessionState::Assessing { elapsed_ms } => {
                *elapsed_ms
            }
            _ => 0,
        }
    }

    pub fn scores(&self) -> Option<&Arc<ScoreHierarchy>> {
        match self {
            SessionState::Completed { scores } => Some(scores),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            SessionState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingPermission => "awaiting_permission",
            SessionState::Recording { .. } => "recording",
            SessionState::Assessing { .. } => "assessing",
            SessionState::Completed { .. } => "completed",
            SessionState::Failed { .. } => "failed",
        }
    }
}

/// Inputs driving the lifecycle
#[derive(Debug, Clone)]
pub enum SessionEvent {
    StartRequested,
    PermissionResolved(PermissionDecision),
    Tick { interval_ms: u64 },
    CaptureFinished,
    AssessmentReturned(Result<Option<ScoreHierarchy>, AssessmentError>),
    Reset,
}

/// Next state for `event`, or `None` if the event does not apply
pub fn transition(state: &SessionState, event: SessionEvent) -> Option<SessionState> {
    match (state, event) {
        (_, SessionEvent::Reset) => Some(SessionState::Idle),
        (SessionState::Idle, SessionEvent::StartRequested) => {
            Some(SessionState::AwaitingPermission)
        }
        (SessionState::AwaitingPermission, SessionEvent::PermissionResolved(decision)) => {
            Some(match decision {
                PermissionDecision::Granted => SessionState::Recording { elapsed_ms: 0 },
                PermissionDecision::Denied => SessionState::Failed {
                    reason: FailureReason::PermissionDenied,
                },
            })
        }
        (SessionState::Recording { elapsed_ms }, SessionEvent::Tick { interval_ms }) => {
            Some(SessionState::Recording {
                elapsed_ms: elapsed_ms.saturating_add(interval_ms),
            })
        }
        (SessionState::Recording { elapsed_ms }, SessionEvent::CaptureFinished) => {
            Some(SessionState::Assessing {
                elapsed_ms: *elapsed_ms,
            })
        }
        (
            SessionState::Recording { .. } | SessionState::Assessing { .. },
            SessionEvent::AssessmentReturned(result),
        ) => Some(match result {
            Ok(Some(scores)) if scores.is_well_formed() => SessionState::Completed {
                scores: Arc::new(scores),
            },
            Ok(_) => SessionState::Failed {
                reason: FailureReason::NoResult,
            },
            Err(err) => SessionState::Failed {
                reason: FailureReason::from(&err),
            },
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::WordScore;

    fn scores() -> ScoreHierarchy {
        ScoreHierarchy {
            overall_score: 82.0,
            accuracy_score: 80.0,
            fluency_score: 85.0,
            completeness_score: 100.0,
            prosody_score: None,
            words: vec![WordScore {
                text: Some("hello".to_string()),
                accuracy_score: 82.0,
                syllables: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_start_only_from_idle() {
        assert_eq!(
            transition(&SessionState::Idle, SessionEvent::StartRequested),
            Some(SessionState::AwaitingPermission)
        );
        for state in [
            SessionState::AwaitingPermission,
            SessionState::Recording { elapsed_ms: 100 },
            SessionState::Assessing { elapsed_ms: 100 },
            SessionState::Failed {
                reason: FailureReason::NoResult,
            },
        ] {
            assert_eq!(transition(&state, SessionEvent::StartRequested), None);
        }
    }

    #[test]
    fn test_permission_outcomes() {
        let granted = transition(
            &SessionState::AwaitingPermission,
            SessionEvent::PermissionResolved(PermissionDecision::Granted),
        );
        assert_eq!(granted, Some(SessionState::Recording { elapsed_ms: 0 }));

        let denied = transition(
            &SessionState::AwaitingPermission,
            SessionEvent::PermissionResolved(PermissionDecision::Denied),
        )
        .unwrap();
        assert_eq!(denied.failure().map(FailureReason::reason).as_deref(), Some("permission denied"));
    }

    #[test]
    fn test_tick_only_counts_while_recording() {
        let state = SessionState::Recording { elapsed_ms: 200 };
        assert_eq!(
            transition(&state, SessionEvent::Tick { interval_ms: 100 }),
            Some(SessionState::Recording { elapsed_ms: 300 })
        );
        assert_eq!(
            transition(
                &SessionState::Assessing { elapsed_ms: 300 },
                SessionEvent::Tick { interval_ms: 100 }
            ),
            None
        );
        assert_eq!(
            transition(&SessionState::Idle, SessionEvent::Tick { interval_ms: 100 }),
            None
        );
    }

    #[test]
    fn test_capture_finished_freezes_elapsed() {
        let state = SessionState::Recording { elapsed_ms: 1700 };
        assert_eq!(
            transition(&state, SessionEvent::CaptureFinished),
            Some(SessionState::Assessing { elapsed_ms: 1700 })
        );
    }

    #[test]
    fn test_assessment_results() {
        let recording = SessionState::Recording { elapsed_ms: 500 };

        let completed =
            transition(&recording, SessionEvent::AssessmentReturned(Ok(Some(scores())))).unwrap();
        assert_eq!(completed.scores().map(|s| s.overall_score), Some(82.0));

        let no_result = transition(
            &SessionState::Assessing { elapsed_ms: 500 },
            SessionEvent::AssessmentReturned(Ok(None)),
        )
        .unwrap();
        assert_eq!(no_result.failure(), Some(&FailureReason::NoResult));

        let transport = transition(
            &recording,
            SessionEvent::AssessmentReturned(Err(AssessmentError::transport("network down"))),
        )
        .unwrap();
        assert_eq!(
            transport.failure(),
            Some(&FailureReason::TransportOrService("network down".to_string()))
        );
    }

    #[test]
    fn test_malformed_scores_are_no_result() {
        let mut bad = scores();
        bad.overall_score = f64::NAN;
        let state = transition(
            &SessionState::Recording { elapsed_ms: 0 },
            SessionEvent::AssessmentReturned(Ok(Some(bad))),
        )
        .unwrap();
        assert_eq!(state.failure(), Some(&FailureReason::NoResult));
    }

    #[test]
    fn test_result_ignored_outside_recording_or_assessing() {
        for state in [SessionState::Idle, SessionState::AwaitingPermission] {
            assert_eq!(
                transition(&state, SessionEvent::AssessmentReturned(Ok(Some(scores())))),
                None
            );
        }
    }

    #[test]
    fn test_reset_from_every_state() {
        for state in [
            SessionState::Idle,
            SessionState::AwaitingPermission,
            SessionState::Recording { elapsed_ms: 10 },
            SessionState::Assessing { elapsed_ms: 10 },
            SessionState::Completed {
                scores: Arc::new(scores()),
            },
            SessionState::Failed {
                reason: FailureReason::PermissionDenied,
            },
        ] {
            assert_eq!(
                transition(&state, SessionEvent::Reset),
                Some(SessionState::Idle)
            );
        }
    }

    #[test]
    fn test_no_result_error_kind_maps_to_no_result() {
        assert_eq!(
            FailureReason::from(&AssessmentError::no_result()),
            FailureReason::NoResult
        );
        assert_eq!(
            FailureReason::from(&AssessmentError::service(5, "canceled")).reason(),
            "canceled (service code 5)"
        );
    }

    #[test]
    fn test_state_json_shape() {
        let json = serde_json::to_value(SessionState::Recording { elapsed_ms: 300 }).unwrap();
        assert_eq!(json["state"], "recording");
        assert_eq!(json["elapsed_ms"], 300);

        let json = serde_json::to_value(SessionState::Failed {
            reason: FailureReason::PermissionDenied,
        })
        .unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["reason"]["kind"], "permission_denied");
    }
}
