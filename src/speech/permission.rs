// Microphone permission capability
//
// Platforms report one of three statuses. Granted and Denied resolve
// immediately; Undetermined asks the user once and remembers the answer.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Final answer to a microphone access request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionDecision {
    Granted,
    Denied,
}

/// Platform-reported record permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Microphone authorization collaborator consumed by the session controller
#[async_trait]
pub trait MicrophonePermission: Send + Sync {
    async fn request_access(&self) -> PermissionDecision;
}

/// Reads the current platform permission status
pub trait PermissionProbe: Send + Sync {
    fn status(&self) -> PermissionStatus;
}

/// Asks the user for microphone access
#[async_trait]
pub trait PermissionPrompt: Send + Sync {
    async fn ask(&self) -> PermissionDecision;
}

/// Adapter turning a probe plus a prompt into a [`MicrophonePermission`]
pub struct PromptingPermission<P, Q> {
    probe: P,
    prompt: Q,
    answered: Mutex<Option<PermissionDecision>>,
}

impl<P: PermissionProbe, Q: PermissionPrompt> PromptingPermission<P, Q> {
    pub fn new(probe: P, prompt: Q) -> Self {
        Self {
            probe,
            prompt,
            answered: Mutex::new(None),
        }
    }

    fn remembered(&self) -> Option<PermissionDecision> {
        self.answered.lock().ok().and_then(|guard| *guard)
    }
}

#[async_trait]
impl<P: PermissionProbe, Q: PermissionPrompt> MicrophonePermission for PromptingPermission<P, Q> {
    async fn request_access(&self) -> PermissionDecision {
        match self.probe.status() {
            PermissionStatus::Granted => PermissionDecision::Granted,
            PermissionStatus::Denied => PermissionDecision::Denied,
            PermissionStatus::Undetermined => {
                if let Some(decision) = self.remembered() {
                    return decision;
                }

                let decision = self.prompt.ask().await;
                log::info!("[Permission] User answered microphone prompt: {:?}", decision);
                if let Ok(mut guard) = self.answered.lock() {
                    *guard = Some(decision);
                }
                decision
            }
        }
    }
}
