//! External speech collaborators consumed by the session controller.
//!
//! The controller only sees these traits: the remote assessment call, the
//! microphone permission check and the text-to-speech "listen" playback.
//! Desktop stubs live in [`stub`] for the CLI and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::AssessmentError;
use crate::scoring::ScoreHierarchy;

pub mod permission;
pub mod stub;

pub use permission::{
    MicrophonePermission, PermissionDecision, PermissionProbe, PermissionPrompt,
    PermissionStatus, PromptingPermission,
};
pub use stub::{LoggingSynthesizer, ScriptedAssessor, ScriptedOutcome, StaticPermission};

/// One reference text to assess in one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub reference_text: String,
    pub language: String,
}

/// Handle the assessor uses to report that microphone capture has ended.
///
/// Calling [`CaptureSignal::capture_finished`] moves the session from
/// Recording to Assessing. Assessors that cannot observe the end of capture
/// simply drop it; the session then stays in Recording until the call
/// returns.
#[derive(Debug)]
pub struct CaptureSignal {
    tx: Option<oneshot::Sender<()>>,
}

impl CaptureSignal {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Signal not connected to any session
    pub fn detached() -> Self {
        Self { tx: None }
    }

    /// Report the end of capture; later calls are ignored
    pub fn capture_finished(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Remote pronunciation assessment.
///
/// Single-shot: one reference text per call. The collaborator manages
/// microphone capture itself once permission is granted. `Ok(None)` means
/// the call succeeded but produced no usable result.
#[async_trait]
pub trait SpeechAssessor: Send + Sync {
    async fn assess(
        &self,
        request: AssessmentRequest,
        capture: CaptureSignal,
    ) -> Result<Option<ScoreHierarchy>, AssessmentError>;
}

/// Text-to-speech request for the "listen" controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub rate: f32,
}

/// On-device text-to-speech playback.
///
/// Fire-and-forget: a new call cancels any utterance still playing.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, utterance: Utterance);
}
