// Session controller error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Session error code constants shared with the host UI
///
/// Error code range: 3001-3009
pub struct SessionErrorCodes {}

impl SessionErrorCodes {
    /// Reference text is empty after trimming whitespace
    pub const EMPTY_REFERENCE_TEXT: i32 = 3001;

    /// An assessment attempt is already running for this session
    pub const ALREADY_IN_PROGRESS: i32 = 3002;

    /// Reference text is read-only in drill mode
    pub const REFERENCE_TEXT_LOCKED: i32 = 3003;

    /// Language tag is not part of the practice catalogue
    pub const UNSUPPORTED_LANGUAGE: i32 = 3004;

    /// Word index outside the navigable word range
    pub const WORD_INDEX_OUT_OF_RANGE: i32 = 3005;

    /// Navigation requested without a completed assessment
    pub const NO_COMPLETED_ASSESSMENT: i32 = 3006;

    /// Session state lock was poisoned
    pub const STATE_POISONED: i32 = 3007;

    /// Drill phrase pool has no phrases
    pub const EMPTY_DRILL_POOL: i32 = 3008;

    /// No tokio runtime available to drive attempts
    pub const RUNTIME_UNAVAILABLE: i32 = 3009;
}

/// Log a session error with structured context
///
/// Fields: error code, component, message and the calling operation.
pub fn log_session_error(err: &SessionError, context: &str) {
    error!(
        "Session error in {}: code={}, component=PracticeSession, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors returned by practice session operations
///
/// None of these change session state: a rejected operation leaves the
/// controller exactly where it was.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Active reference text is empty once trimmed
    EmptyReferenceText,

    /// Start requested while an attempt is not idle
    AlreadyInProgress,

    /// Edit requested while drill mode owns the reference text
    ReferenceTextLocked,

    /// Language tag outside the catalogue
    UnsupportedLanguage { tag: String },

    /// Word selection outside `0..len`
    WordIndexOutOfRange { index: usize, len: usize },

    /// Score navigation requested with no completed assessment
    NoCompletedAssessment,

    /// Session state lock was poisoned
    StatePoisoned,

    /// Drill phrase pool is empty
    EmptyDrillPool,

    /// Controller created outside a tokio runtime
    RuntimeUnavailable,
}

impl ErrorCode for SessionError {
    fn code(&self) -> i32 {
        match self {
            SessionError::EmptyReferenceText => SessionErrorCodes::EMPTY_REFERENCE_TEXT,
            SessionError::AlreadyInProgress => SessionErrorCodes::ALREADY_IN_PROGRESS,
            SessionError::ReferenceTextLocked => SessionErrorCodes::REFERENCE_TEXT_LOCKED,
            SessionError::UnsupportedLanguage { .. } => SessionErrorCodes::UNSUPPORTED_LANGUAGE,
            SessionError::WordIndexOutOfRange { .. } => {
                SessionErrorCodes::WORD_INDEX_OUT_OF_RANGE
            }
            SessionError::NoCompletedAssessment => SessionErrorCodes::NO_COMPLETED_ASSESSMENT,
            SessionError::StatePoisoned => SessionErrorCodes::STATE_POISONED,
            SessionError::EmptyDrillPool => SessionErrorCodes::EMPTY_DRILL_POOL,
            SessionError::RuntimeUnavailable => SessionErrorCodes::RUNTIME_UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            SessionError::EmptyReferenceText => "Reference text is empty".to_string(),
            SessionError::AlreadyInProgress => {
                "Assessment already in progress. Call reset_assessment() first.".to_string()
            }
            SessionError::ReferenceTextLocked => {
                "Reference text is read-only in drill mode".to_string()
            }
            SessionError::UnsupportedLanguage { tag } => {
                format!("Unsupported language: {}", tag)
            }
            SessionError::WordIndexOutOfRange { index, len } => {
                format!("Word index {} out of range (0..{})", index, len)
            }
            SessionError::NoCompletedAssessment => "No completed assessment".to_string(),
            SessionError::StatePoisoned => "Session state lock poisoned".to_string(),
            SessionError::EmptyDrillPool => "Drill phrase pool is empty".to_string(),
            SessionError::RuntimeUnavailable => {
                "No async runtime available for assessment attempts".to_string()
            }
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SessionError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SessionError {}
