// Error types for the pronunciation trainer core
//
// This module defines the session controller errors and the failure value
// returned by the remote speech-assessment collaborator, both carrying
// stable numeric codes for the host UI.

mod assessment;
mod session;

pub use assessment::{log_assessment_error, AssessmentError, AssessmentErrorCodes, AssessmentErrorKind};
pub use session::{log_session_error, SessionError, SessionErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the host boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
