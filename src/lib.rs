// Pronunciation Trainer Core - practice session state machine
// Reference-text modes, assessment lifecycle and score navigation

// Module declarations
pub mod config;
pub mod error;
pub mod http;
pub mod navigation;
pub mod onboarding;
pub mod practice;
pub mod scoring;
pub mod session;
pub mod speech;
pub mod telemetry;

// Re-exports for convenience
pub use config::AppConfig;
pub use error::{AssessmentError, ErrorCode, SessionError};
pub use navigation::{NavigatorState, NavigatorView, ScoreNavigator};
pub use onboarding::OnboardingStore;
pub use practice::{PracticeMode, PracticeModeState};
pub use scoring::{band, ScoreBand, ScoreHierarchy, SyllableScore, WordScore};
pub use session::{
    FailureReason, PracticeSessionController, SessionSnapshot, SessionState, SessionToken,
    SpeechCollaborators,
};

/// Initialize logging for the host process
///
/// Safe to call more than once; later calls keep the first subscriber.
#[cfg(target_os = "android")]
pub fn init_logging() {
    use tracing_subscriber::prelude::*;

    match tracing_android::layer("PronunciationTrainer") {
        Ok(layer) => {
            let _ = tracing_subscriber::registry().with(layer).try_init();
        }
        Err(err) => eprintln!("PronunciationTrainer: android log layer unavailable: {err}"),
    }
}

#[cfg(not(target_os = "android"))]
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
        log::info!("logging initialized twice");
    }
}
