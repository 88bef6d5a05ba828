// Speech assessment collaborator error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Assessment error code constants
///
/// Error code range: 4001-4004
pub struct AssessmentErrorCodes {}

impl AssessmentErrorCodes {
    /// Network or transport failure talking to the assessment service
    pub const TRANSPORT: i32 = 4001;

    /// Service rejected or cancelled the recognition
    pub const SERVICE: i32 = 4002;

    /// Audio session could not be configured for capture
    pub const AUDIO_SESSION: i32 = 4003;

    /// Collaborator produced no usable result
    pub const NO_RESULT: i32 = 4004;
}

/// Where an assessment failure originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentErrorKind {
    Transport,
    Service,
    AudioSession,
    NoResult,
}

/// Log an assessment failure with structured context
pub fn log_assessment_error(err: &AssessmentError, context: &str) {
    error!(
        "Assessment error in {}: code={}, component=SpeechAssessor, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Failure value returned by the speech assessment collaborator
///
/// `service_code` keeps the backend's own cancellation code when it reports
/// one; `code()` is the crate-level code for the failure kind.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssessmentError {
    pub kind: AssessmentErrorKind,
    pub service_code: Option<i32>,
    pub message: String,
}

impl AssessmentError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: AssessmentErrorKind::Transport,
            service_code: None,
            message: message.into(),
        }
    }

    pub fn service(service_code: i32, message: impl Into<String>) -> Self {
        Self {
            kind: AssessmentErrorKind::Service,
            service_code: Some(service_code),
            message: message.into(),
        }
    }

    pub fn audio_session(message: impl Into<String>) -> Self {
        Self {
            kind: AssessmentErrorKind::AudioSession,
            service_code: None,
            message: message.into(),
        }
    }

    pub fn no_result() -> Self {
        Self {
            kind: AssessmentErrorKind::NoResult,
            service_code: None,
            message: "No pronunciation result.".to_string(),
        }
    }
}

impl ErrorCode for AssessmentError {
    fn code(&self) -> i32 {
        match self.kind {
            AssessmentErrorKind::Transport => AssessmentErrorCodes::TRANSPORT,
            AssessmentErrorKind::Service => AssessmentErrorCodes::SERVICE,
            AssessmentErrorKind::AudioSession => AssessmentErrorCodes::AUDIO_SESSION,
            AssessmentErrorKind::NoResult => AssessmentErrorCodes::NO_RESULT,
        }
    }

    fn message(&self) -> String {
        match self.service_code {
            Some(service_code) => format!("{} (service code {})", self.message, service_code),
            None => self.message.clone(),
        }
    }
}

impl fmt::Display for AssessmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AssessmentError::{:?} (code {}): {}",
            self.kind,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AssessmentError {}

impl From<std::io::Error> for AssessmentError {
    fn from(err: std::io::Error) -> Self {
        AssessmentError::transport(err.to_string())
    }
}
