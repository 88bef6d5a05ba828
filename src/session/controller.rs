//! PracticeSessionController: single owner of a practice screen's state.
//!
//! All session state (lifecycle, practice text, language, score navigator,
//! history) lives behind one mutex. Every applied transition publishes a
//! [`SessionSnapshot`] on a broadcast channel in application order.
//!
//! Each attempt gets a fresh generation token. Completions from the
//! permission collaborator, the assessor and the recording timer carry the
//! token of the attempt that issued them and are dropped when it no longer
//! matches, so a reset (or a newer attempt) can never be overwritten by a
//! late result.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{log_assessment_error, log_session_error, SessionError};
use crate::navigation::{reference_words, NavigatorView, ScoreNavigator};
use crate::practice::{
    find_language, DrillPhrasePool, PracticeMode, PracticeModeState, DEFAULT_LANGUAGE_TAG,
};
use crate::scoring::band;
use crate::session::history::{AttemptSummary, PracticeHistory};
use crate::session::state::{transition, SessionEvent, SessionState, SessionToken};
use crate::session::ticker::RecordingTicker;
use crate::speech::{
    AssessmentRequest, CaptureSignal, MicrophonePermission, PermissionDecision, SpeechAssessor,
    SpeechSynthesizer, Utterance,
};
use crate::telemetry::{AttemptEvent, TelemetryCollector, TelemetrySnapshot};

const SNAPSHOT_BUFFER: usize = 64;
const TELEMETRY_BUFFER: usize = 256;
const TELEMETRY_HISTORY: usize = 64;

/// Everything a host needs to render the practice screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub session: SessionState,
    pub practice: PracticeModeState,
    pub language: String,
    /// Start action enabled: idle with non-blank reference text
    pub can_start: bool,
    pub navigator: Option<NavigatorView>,
}

/// External speech services used by the controller
#[derive(Clone)]
pub struct SpeechCollaborators {
    pub assessor: Arc<dyn SpeechAssessor>,
    pub permission: Arc<dyn MicrophonePermission>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

struct Inner {
    generation: u64,
    state: SessionState,
    practice: PracticeModeState,
    language: String,
    navigator: Option<ScoreNavigator>,
    /// Request of the attempt identified by `generation`
    attempt: Option<AssessmentRequest>,
    ticker: Option<RecordingTicker>,
    attempt_task: Option<JoinHandle<()>>,
    history: PracticeHistory,
    rng: StdRng,
}

impl Inner {
    fn can_start(&self) -> bool {
        self.state.is_idle() && self.practice.has_text()
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            generation: self.generation,
            session: self.state.clone(),
            practice: self.practice.clone(),
            language: self.language.clone(),
            can_start: self.can_start(),
            navigator: self.navigator.as_ref().map(ScoreNavigator::view),
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    pool: DrillPhrasePool,
    collaborators: SpeechCollaborators,
    snapshots: broadcast::Sender<SessionSnapshot>,
    telemetry: TelemetryCollector,
    tick_interval: Duration,
    normal_rate: f32,
    slow_rate: f32,
    runtime: Handle,
}

impl Shared {
    fn lock_inner(&self) -> Result<MutexGuard<'_, Inner>, SessionError> {
        self.inner.lock().map_err(|_| SessionError::StatePoisoned)
    }

    fn publish(&self, inner: &Inner) {
        // No subscribers is fine; snapshot() still answers.
        let _ = self.snapshots.send(inner.snapshot());
    }

    /// Install `next`, release the timer outside Recording and publish
    fn set_state(&self, inner: &mut Inner, next: SessionState) {
        if !matches!(next, SessionState::Recording { .. }) {
            inner.ticker = None;
        }
        if !next.is_running() {
            inner.attempt_task = None;
        }
        inner.state = next;
        self.publish(inner);
    }

    /// Apply an event issued by the attempt identified by `token`.
    ///
    /// Returns `false` when the token is stale or the event does not apply.
    fn apply(self: &Arc<Self>, token: SessionToken, event: SessionEvent) -> bool {
        let mut guard = match self.lock_inner() {
            Ok(guard) => guard,
            Err(err) => {
                log_session_error(&err, "apply_attempt_event");
                return false;
            }
        };
        let inner = &mut *guard;

        if inner.generation != token.generation() {
            if !matches!(event, SessionEvent::Tick { .. }) {
                warn!(
                    generation = token.generation(),
                    current_generation = inner.generation,
                    "Discarding stale attempt update: {:?}",
                    event
                );
                self.telemetry.publish(AttemptEvent::StaleResultDiscarded {
                    generation: token.generation(),
                    current_generation: inner.generation,
                });
            }
            return false;
        }

        let permission = match &event {
            SessionEvent::PermissionResolved(decision) => Some(*decision),
            _ => None,
        };
        let capture_finished = matches!(event, SessionEvent::CaptureFinished);
        let recorded_ms = inner.state.elapsed_ms();

        let Some(next) = transition(&inner.state, event) else {
            debug!(
                generation = token.generation(),
                state = inner.state.name(),
                "Attempt event ignored"
            );
            return false;
        };

        if let Some(decision) = permission {
            info!(generation = token.generation(), ?decision, "Microphone permission resolved");
            self.telemetry.publish(AttemptEvent::PermissionResolved {
                generation: token.generation(),
                decision,
            });
        }
        if capture_finished {
            debug!(generation = token.generation(), elapsed_ms = recorded_ms, "Capture finished");
            self.telemetry.publish(AttemptEvent::CaptureFinished {
                generation: token.generation(),
                elapsed_ms: recorded_ms,
            });
        }

        match &next {
            SessionState::Recording { .. } if permission.is_some() => {
                self.start_ticker(inner, token);
            }
            SessionState::Completed { scores } => {
                let request = inner.attempt.take().unwrap_or_else(|| AssessmentRequest {
                    reference_text: String::new(),
                    language: inner.language.clone(),
                });
                inner.navigator = Some(ScoreNavigator::new(
                    &request.reference_text,
                    Arc::clone(scores),
                ));
                inner.history.push(AttemptSummary::new(
                    token.generation(),
                    &request.reference_text,
                    &request.language,
                    scores,
                    recorded_ms,
                ));
                info!(
                    generation = token.generation(),
                    overall_score = scores.overall_score,
                    "Assessment completed"
                );
                self.telemetry.publish(AttemptEvent::Completed {
                    generation: token.generation(),
                    overall_score: scores.overall_score,
                    band: band(scores.overall_score),
                    elapsed_ms: recorded_ms,
                });
            }
            SessionState::Failed { reason } => {
                inner.attempt = None;
                warn!(generation = token.generation(), %reason, "Assessment failed");
                self.telemetry.publish(AttemptEvent::Failed {
                    generation: token.generation(),
                    reason: reason.reason(),
                });
            }
            _ => {}
        }

        self.set_state(inner, next);
        true
    }

    fn start_ticker(self: &Arc<Self>, inner: &mut Inner, token: SessionToken) {
        let shared: Weak<Shared> = Arc::downgrade(self);
        let interval_ms = self.tick_interval.as_millis() as u64;
        inner.ticker = Some(RecordingTicker::spawn(
            &self.runtime,
            self.tick_interval,
            move || match shared.upgrade() {
                Some(shared) => shared.apply(token, SessionEvent::Tick { interval_ms }),
                None => false,
            },
        ));
    }

    /// Drive one attempt: permission, capture, remote assessment
    async fn run_attempt(self: Arc<Self>, token: SessionToken, request: AssessmentRequest) {
        let decision = self.collaborators.permission.request_access().await;
        if !self.apply(token, SessionEvent::PermissionResolved(decision))
            || decision == PermissionDecision::Denied
        {
            return;
        }

        let (signal, mut capture_rx) = CaptureSignal::channel();
        let assessment = self.collaborators.assessor.assess(request, signal);
        tokio::pin!(assessment);

        let result = tokio::select! {
            biased;
            Ok(()) = &mut capture_rx => {
                self.apply(token, SessionEvent::CaptureFinished);
                assessment.await
            }
            result = &mut assessment => result,
        };

        if let Err(err) = &result {
            log_assessment_error(err, "run_attempt");
        }
        self.apply(token, SessionEvent::AssessmentReturned(result));
    }
}

/// Controller for one practice screen
///
/// Operations are synchronous and return immediately; the permission check
/// and remote assessment run on the tokio runtime captured at construction.
/// Dropping the controller stops the recording timer and aborts the attempt
/// in flight.
///
/// # Example
/// ```ignore
/// let controller = PracticeSessionController::new(&config, collaborators)?;
/// controller.set_reference_text("hello world")?;
/// let token = controller.start_assessment()?;
/// let mut updates = controller.subscribe();
/// // ... render snapshots until Completed or Failed ...
/// controller.reset_assessment()?;
/// ```
pub struct PracticeSessionController {
    shared: Arc<Shared>,
}

impl PracticeSessionController {
    /// Create a controller bound to the current tokio runtime
    ///
    /// # Errors
    /// - `RuntimeUnavailable` when called outside a runtime
    /// - `EmptyDrillPool` when the configured drill pool has no phrases
    pub fn new(
        config: &AppConfig,
        collaborators: SpeechCollaborators,
    ) -> Result<Self, SessionError> {
        let runtime = Handle::try_current().map_err(|_| {
            let err = SessionError::RuntimeUnavailable;
            log_session_error(&err, "new");
            err
        })?;
        Self::with_runtime(config, collaborators, runtime)
    }

    /// Create a controller that spawns attempts on `runtime`
    pub fn with_runtime(
        config: &AppConfig,
        collaborators: SpeechCollaborators,
        runtime: Handle,
    ) -> Result<Self, SessionError> {
        let pool = config
            .drill_pool()
            .inspect_err(|err| log_session_error(err, "with_runtime"))?;

        let language = match find_language(&config.session.default_language) {
            Some(language) => language.tag,
            None => {
                warn!(
                    "Unknown default language {:?}, using {}",
                    config.session.default_language, DEFAULT_LANGUAGE_TAG
                );
                DEFAULT_LANGUAGE_TAG
            }
        };

        let rng = match config.drill.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (snapshots, _) = broadcast::channel(SNAPSHOT_BUFFER);

        let inner = Inner {
            generation: 0,
            state: SessionState::Idle,
            practice: PracticeModeState::new(),
            language: language.to_string(),
            navigator: None,
            attempt: None,
            ticker: None,
            attempt_task: None,
            history: PracticeHistory::new(config.session.history_capacity),
            rng,
        };

        Ok(Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                pool,
                collaborators,
                snapshots,
                telemetry: TelemetryCollector::new(TELEMETRY_BUFFER, TELEMETRY_HISTORY),
                tick_interval: Duration::from_millis(config.session.tick_interval_ms.max(1)),
                normal_rate: config.speech.normal_rate,
                slow_rate: config.speech.slow_rate,
                runtime,
            }),
        })
    }

    /// Current render state
    pub fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        Ok(self.shared.lock_inner()?.snapshot())
    }

    /// Stream of snapshots, one per applied change
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn session_state(&self) -> Result<SessionState, SessionError> {
        Ok(self.shared.lock_inner()?.state.clone())
    }

    pub fn practice_state(&self) -> Result<PracticeModeState, SessionError> {
        Ok(self.shared.lock_inner()?.practice.clone())
    }

    pub fn can_start(&self) -> Result<bool, SessionError> {
        Ok(self.shared.lock_inner()?.can_start())
    }

    pub fn language(&self) -> Result<String, SessionError> {
        Ok(self.shared.lock_inner()?.language.clone())
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.shared.telemetry.snapshot()
    }

    pub fn subscribe_telemetry(&self) -> broadcast::Receiver<AttemptEvent> {
        self.shared.telemetry.subscribe()
    }

    /// Completed attempts, oldest first
    pub fn history(&self) -> Result<Vec<AttemptSummary>, SessionError> {
        Ok(self.shared.lock_inner()?.history.entries())
    }

    pub fn last_session(&self) -> Result<Option<AttemptSummary>, SessionError> {
        Ok(self.shared.lock_inner()?.history.last().cloned())
    }

    /// Switch between Manual and Drill.
    ///
    /// Selecting Drill while already in Drill rolls a new phrase.
    pub fn set_mode(&self, mode: PracticeMode) -> Result<(), SessionError> {
        let mut guard = self.shared.lock_inner()?;
        let inner = &mut *guard;
        inner.practice = inner.practice.with_mode(mode, &self.shared.pool, &mut inner.rng);
        debug!(?mode, text = %inner.practice.active_text, "Practice mode set");
        self.shared.publish(inner);
        Ok(())
    }

    /// Roll a new drill phrase; no effect in Manual mode
    pub fn shuffle_drill_phrase(&self) -> Result<(), SessionError> {
        let mode = self.shared.lock_inner()?.practice.mode;
        match mode {
            PracticeMode::Drill => self.set_mode(PracticeMode::Drill),
            PracticeMode::Manual => Ok(()),
        }
    }

    /// Replace the reference text (Manual mode only)
    ///
    /// # Errors
    /// - `ReferenceTextLocked` in Drill mode
    pub fn set_reference_text(&self, text: impl Into<String>) -> Result<(), SessionError> {
        let mut guard = self.shared.lock_inner()?;
        let inner = &mut *guard;
        inner.practice = inner
            .practice
            .with_text(text)
            .inspect_err(|err| log_session_error(err, "set_reference_text"))?;
        self.shared.publish(inner);
        Ok(())
    }

    /// Select the practice language by tag.
    ///
    /// In Manual mode the reference text becomes the language's default
    /// sentence; in Drill mode only the language changes.
    pub fn select_language(&self, tag: &str) -> Result<(), SessionError> {
        let language = find_language(tag)
            .ok_or_else(|| SessionError::UnsupportedLanguage {
                tag: tag.to_string(),
            })
            .inspect_err(|err| log_session_error(err, "select_language"))?;

        let mut guard = self.shared.lock_inner()?;
        let inner = &mut *guard;
        if inner.practice.mode == PracticeMode::Manual {
            inner.practice = inner.practice.with_text(language.default_text)?;
        }
        inner.language = language.tag.to_string();
        info!(language = language.tag, "Practice language selected");
        self.shared.publish(inner);
        Ok(())
    }

    /// Begin an assessment attempt.
    ///
    /// Synchronously moves Idle to AwaitingPermission and returns the new
    /// attempt's token; permission and assessment continue on the runtime.
    ///
    /// # Errors
    /// - `AlreadyInProgress` unless the session is Idle
    /// - `EmptyReferenceText` when the active text is blank
    ///
    /// Neither error changes any state.
    pub fn start_assessment(&self) -> Result<SessionToken, SessionError> {
        let mut guard = self.shared.lock_inner()?;
        let inner = &mut *guard;

        if !inner.state.is_idle() {
            let err = SessionError::AlreadyInProgress;
            log_session_error(&err, "start_assessment");
            return Err(err);
        }
        if !inner.practice.has_text() {
            let err = SessionError::EmptyReferenceText;
            log_session_error(&err, "start_assessment");
            return Err(err);
        }
        let next = transition(&inner.state, SessionEvent::StartRequested)
            .ok_or(SessionError::AlreadyInProgress)?;

        inner.generation += 1;
        let token = SessionToken(inner.generation);
        let request = AssessmentRequest {
            reference_text: inner.practice.active_text.clone(),
            language: inner.language.clone(),
        };
        inner.navigator = None;
        inner.attempt = Some(request.clone());

        info!(
            generation = token.generation(),
            language = %request.language,
            "Assessment started"
        );
        self.shared.telemetry.publish(AttemptEvent::Started {
            generation: token.generation(),
            language: request.language.clone(),
            word_count: reference_words(&request.reference_text).len(),
        });
        self.shared.set_state(inner, next);

        let shared = Arc::clone(&self.shared);
        inner.attempt_task = Some(self.shared.runtime.spawn(shared.run_attempt(token, request)));
        Ok(token)
    }

    /// Reset a finished attempt and start over with the current text
    ///
    /// # Errors
    /// - `AlreadyInProgress` while an attempt is still running
    pub fn retry_assessment(&self) -> Result<SessionToken, SessionError> {
        if self.shared.lock_inner()?.state.is_running() {
            let err = SessionError::AlreadyInProgress;
            log_session_error(&err, "retry_assessment");
            return Err(err);
        }
        self.reset_assessment()?;
        self.start_assessment()
    }

    /// Return to Idle from any state.
    ///
    /// Invalidates the current token, stops the recording timer and drops
    /// the score navigator. The remote call is not cancelled; its result is
    /// discarded when it arrives. The active text is restored for the
    /// current mode.
    pub fn reset_assessment(&self) -> Result<(), SessionError> {
        let mut guard = self.shared.lock_inner()?;
        let inner = &mut *guard;

        let discarded = inner.generation;
        inner.generation += 1;
        inner.ticker = None;
        inner.attempt_task = None;
        inner.navigator = None;
        inner.attempt = None;
        inner.practice = inner.practice.restored(&self.shared.pool, &mut inner.rng);

        info!(
            generation = inner.generation,
            discarded,
            from = inner.state.name(),
            "Assessment reset"
        );
        self.shared.telemetry.publish(AttemptEvent::Reset {
            generation: inner.generation,
        });
        let next = transition(&inner.state, SessionEvent::Reset).unwrap_or_default();
        self.shared.set_state(inner, next);
        Ok(())
    }

    /// The practice screen was dismissed
    pub fn dismiss(&self) -> Result<(), SessionError> {
        self.reset_assessment()
    }

    pub fn navigator_view(&self) -> Result<Option<NavigatorView>, SessionError> {
        Ok(self
            .shared
            .lock_inner()?
            .navigator
            .as_ref()
            .map(ScoreNavigator::view))
    }

    /// Select a word and open its detail view
    ///
    /// # Errors
    /// - `NoCompletedAssessment` without a completed attempt
    /// - `WordIndexOutOfRange` for an index past the reference words
    pub fn select_word(&self, index: usize) -> Result<NavigatorView, SessionError> {
        self.with_navigator("select_word", |navigator| navigator.select_word(index))
    }

    /// Advance to the next word, wrapping to the first
    pub fn next_word(&self) -> Result<NavigatorView, SessionError> {
        self.with_navigator("next_word", |navigator| {
            navigator.next_word();
            Ok(())
        })
    }

    /// Step back to the previous word, wrapping to the last
    pub fn previous_word(&self) -> Result<NavigatorView, SessionError> {
        self.with_navigator("previous_word", |navigator| {
            navigator.previous_word();
            Ok(())
        })
    }

    pub fn close_detail(&self) -> Result<NavigatorView, SessionError> {
        self.with_navigator("close_detail", |navigator| {
            navigator.close_detail();
            Ok(())
        })
    }

    fn with_navigator<F>(&self, context: &str, op: F) -> Result<NavigatorView, SessionError>
    where
        F: FnOnce(&mut ScoreNavigator) -> Result<(), SessionError>,
    {
        let mut guard = self.shared.lock_inner()?;
        let inner = &mut *guard;
        let navigator = inner
            .navigator
            .as_mut()
            .ok_or(SessionError::NoCompletedAssessment)
            .inspect_err(|err| log_session_error(err, context))?;
        op(navigator).inspect_err(|err| log_session_error(err, context))?;
        let view = navigator.view();
        self.shared.publish(inner);
        Ok(view)
    }

    /// Speak the active reference text at the normal rate.
    ///
    /// Returns `false` when there is nothing to speak.
    pub fn listen(&self) -> Result<bool, SessionError> {
        let utterance = {
            let inner = self.shared.lock_inner()?;
            if !inner.practice.has_text() {
                return Ok(false);
            }
            Utterance {
                text: inner.practice.active_text.clone(),
                language: inner.language.clone(),
                rate: self.shared.normal_rate,
            }
        };
        self.shared.collaborators.synthesizer.speak(utterance);
        Ok(true)
    }

    /// Speak the navigator's current word, optionally at the slow rate
    ///
    /// # Errors
    /// - `NoCompletedAssessment` without a completed attempt
    pub fn listen_to_word(&self, slow: bool) -> Result<bool, SessionError> {
        let utterance = {
            let inner = self.shared.lock_inner()?;
            let navigator = inner
                .navigator
                .as_ref()
                .ok_or(SessionError::NoCompletedAssessment)
                .inspect_err(|err| log_session_error(err, "listen_to_word"))?;
            let word = navigator.current_word();
            if word.trim().is_empty() {
                return Ok(false);
            }
            Utterance {
                text: word.to_string(),
                language: inner.language.clone(),
                rate: if slow {
                    self.shared.slow_rate
                } else {
                    self.shared.normal_rate
                },
            }
        };
        self.shared.collaborators.synthesizer.speak(utterance);
        Ok(true)
    }
}

impl Drop for PracticeSessionController {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.shared.inner.lock() {
            inner.generation += 1;
            inner.ticker = None;
            if let Some(task) = inner.attempt_task.take() {
                task.abort();
            }
        }
    }
}
