// Session module - practice session lifecycle
//
// This module provides:
// 1. SessionState: the assessment lifecycle and its pure transition function
// 2. RecordingTicker: scoped recording timer released on every exit path
// 3. PracticeHistory: bounded record of completed attempts
// 4. PracticeSessionController: owner of all session state, driving the
//    permission check, recording, remote assessment and score navigation
//
// Attempt flow:
//   Idle -> AwaitingPermission -> Recording -> (Assessing) -> Completed | Failed
//   reset from any state -> Idle (in-flight results are discarded by token)

pub mod controller;
pub mod history;
pub mod state;
pub mod ticker;

pub use controller::{PracticeSessionController, SessionSnapshot, SpeechCollaborators};
pub use history::{AttemptSummary, PracticeHistory};
pub use state::{transition, FailureReason, SessionEvent, SessionState, SessionToken};
pub use ticker::RecordingTicker;
