use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AssessmentError;
use crate::scoring::{ScoreHierarchy, SyllableScore, WordScore};

use super::{
    AssessmentRequest, CaptureSignal, MicrophonePermission, PermissionDecision,
    SpeechAssessor, SpeechSynthesizer, Utterance,
};

/// What a [`ScriptedAssessor`] returns once its delays elapse
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Build deterministic scores from the reference text
    Synthesize,
    /// Return this hierarchy regardless of the request
    Fixed(ScoreHierarchy),
    /// Succeed without a usable result
    NoResult,
    /// Fail with this error
    Fail(AssessmentError),
}

/// Desktop stand-in for the remote assessment service.
///
/// Simulates a capture phase and a scoring phase with fixed delays and
/// reports the end of capture through the [`CaptureSignal`].
pub struct ScriptedAssessor {
    outcome: ScriptedOutcome,
    capture_delay: Duration,
    scoring_delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedAssessor {
    pub fn new(outcome: ScriptedOutcome) -> Self {
        Self {
            outcome,
            capture_delay: Duration::from_millis(300),
            scoring_delay: Duration::from_millis(200),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delays(mut self, capture_delay: Duration, scoring_delay: Duration) -> Self {
        self.capture_delay = capture_delay;
        self.scoring_delay = scoring_delay;
        self
    }

    /// Number of assessment calls received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Load a score hierarchy fixture from a JSON file
    pub fn load_fixture<P: AsRef<Path>>(path: P) -> std::io::Result<ScoreHierarchy> {
        let contents = std::fs::read_to_string(&path)?;
        serde_json::from_str(&contents)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }
}

#[async_trait]
impl SpeechAssessor for ScriptedAssessor {
    async fn assess(
        &self,
        request: AssessmentRequest,
        mut capture: CaptureSignal,
    ) -> Result<Option<ScoreHierarchy>, AssessmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(self.capture_delay).await;
        capture.capture_finished();
        tokio::time::sleep(self.scoring_delay).await;

        match &self.outcome {
            ScriptedOutcome::Synthesize => Ok(Some(synthesize_scores(&request.reference_text))),
            ScriptedOutcome::Fixed(scores) => Ok(Some(scores.clone())),
            ScriptedOutcome::NoResult => Ok(None),
            ScriptedOutcome::Fail(err) => Err(err.clone()),
        }
    }
}

/// Deterministic pseudo-score in [60, 100] derived from the characters
fn pseudo_score(token: &str) -> f64 {
    let sum: u32 = token.chars().map(|c| c as u32).sum();
    60.0 + f64::from(sum % 41)
}

/// Build a plausible score hierarchy for `reference_text`.
///
/// One word per whitespace-separated token, one syllable per letter.
pub fn synthesize_scores(reference_text: &str) -> ScoreHierarchy {
    let words: Vec<WordScore> = reference_text
        .split_whitespace()
        .map(|token| {
            let syllables = token
                .chars()
                .filter(|c| c.is_alphabetic())
                .map(|c| {
                    let label = c.to_uppercase().to_string();
                    SyllableScore {
                        accuracy_score: pseudo_score(&label),
                        syllable_label: Some(label.clone()),
                        grapheme_label: Some(c.to_string()),
                    }
                })
                .collect();
            WordScore {
                text: Some(token.to_string()),
                accuracy_score: pseudo_score(token),
                syllables,
            }
        })
        .collect();

    let mean = if words.is_empty() {
        0.0
    } else {
        words.iter().map(|w| w.accuracy_score).sum::<f64>() / words.len() as f64
    };

    ScoreHierarchy {
        overall_score: mean,
        accuracy_score: mean,
        fluency_score: (mean + 5.0).min(100.0),
        completeness_score: if words.is_empty() { 0.0 } else { 100.0 },
        prosody_score: Some((mean - 3.0).max(0.0)),
        words,
    }
}

/// Permission collaborator with a fixed answer
pub struct StaticPermission {
    decision: PermissionDecision,
}

impl StaticPermission {
    pub fn granted() -> Self {
        Self {
            decision: PermissionDecision::Granted,
        }
    }

    pub fn denied() -> Self {
        Self {
            decision: PermissionDecision::Denied,
        }
    }
}

#[async_trait]
impl MicrophonePermission for StaticPermission {
    async fn request_access(&self) -> PermissionDecision {
        self.decision
    }
}

/// Synthesizer that logs utterances instead of playing them.
///
/// Keeps the utterance currently "playing"; a new call replaces it.
#[derive(Default)]
pub struct LoggingSynthesizer {
    current: Mutex<Option<Utterance>>,
    spoken: AtomicUsize,
}

impl LoggingSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent utterance, if any
    pub fn current(&self) -> Option<Utterance> {
        self.current.lock().ok().and_then(|guard| guard.clone())
    }

    /// Total utterances requested
    pub fn spoken(&self) -> usize {
        self.spoken.load(Ordering::SeqCst)
    }
}

impl SpeechSynthesizer for LoggingSynthesizer {
    fn speak(&self, utterance: Utterance) {
        log::info!(
            "[Speech] speak lang={} rate={} text={:?}",
            utterance.language,
            utterance.rate,
            utterance.text
        );
        self.spoken.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.current.lock() {
            if let Some(previous) = guard.replace(utterance) {
                log::debug!("[Speech] cancelled utterance {:?}", previous.text);
            }
        }
    }
}
