// PracticeModeState - Manual vs Drill reference text state machine
//
// Transition table:
//   Manual -> Drill  : keep typed text in last_manual_text, show cached drill
//                      phrase (rolling one if none is cached)
//   Drill  -> Manual : show last_manual_text (may be empty)
//   Drill  -> Drill  : roll a new drill phrase (shuffle)
//   Manual -> Manual : no-op
//
// last_manual_text only changes through an edit made in Manual mode.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::practice::DrillPhrasePool;

/// Which source supplies the reference text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PracticeMode {
    /// User-authored text
    #[default]
    Manual,
    /// Randomly selected drill phrase, read-only
    Drill,
}

/// Active reference text plus the sticky memory of each mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PracticeModeState {
    pub mode: PracticeMode,
    pub active_text: String,
    pub last_manual_text: String,
    pub current_drill_text: Option<String>,
}

impl PracticeModeState {
    /// Manual mode with empty text and no cached drill phrase
    pub fn new() -> Self {
        Self::default()
    }

    /// Next state after switching to `mode`
    pub fn with_mode<R: Rng + ?Sized>(
        &self,
        mode: PracticeMode,
        pool: &DrillPhrasePool,
        rng: &mut R,
    ) -> Self {
        match (self.mode, mode) {
            (PracticeMode::Manual, PracticeMode::Manual) => self.clone(),
            (PracticeMode::Manual, PracticeMode::Drill) => {
                let drill_text = self
                    .current_drill_text
                    .clone()
                    .unwrap_or_else(|| pool.pick(rng).to_string());
                Self {
                    mode: PracticeMode::Drill,
                    active_text: drill_text.clone(),
                    last_manual_text: self.active_text.clone(),
                    current_drill_text: Some(drill_text),
                }
            }
            (PracticeMode::Drill, PracticeMode::Manual) => Self {
                mode: PracticeMode::Manual,
                active_text: self.last_manual_text.clone(),
                last_manual_text: self.last_manual_text.clone(),
                current_drill_text: self.current_drill_text.clone(),
            },
            (PracticeMode::Drill, PracticeMode::Drill) => {
                let drill_text = pool.pick(rng).to_string();
                Self {
                    mode: PracticeMode::Drill,
                    active_text: drill_text.clone(),
                    last_manual_text: self.last_manual_text.clone(),
                    current_drill_text: Some(drill_text),
                }
            }
        }
    }

    /// Next state after the user edits the reference text
    ///
    /// Only Manual mode accepts edits; the edit is mirrored into
    /// `last_manual_text`.
    pub fn with_text(&self, text: impl Into<String>) -> Result<Self, SessionError> {
        if self.mode != PracticeMode::Manual {
            return Err(SessionError::ReferenceTextLocked);
        }

        let text = text.into();
        Ok(Self {
            mode: PracticeMode::Manual,
            active_text: text.clone(),
            last_manual_text: text,
            current_drill_text: self.current_drill_text.clone(),
        })
    }

    /// Re-apply the current mode's text-restore rule
    ///
    /// Used when a session is reset so the shown text matches the mode.
    pub fn restored<R: Rng + ?Sized>(&self, pool: &DrillPhrasePool, rng: &mut R) -> Self {
        match self.mode {
            PracticeMode::Manual => Self {
                active_text: self.last_manual_text.clone(),
                ..self.clone()
            },
            PracticeMode::Drill => {
                let drill_text = self
                    .current_drill_text
                    .clone()
                    .unwrap_or_else(|| pool.pick(rng).to_string());
                Self {
                    active_text: drill_text.clone(),
                    current_drill_text: Some(drill_text),
                    ..self.clone()
                }
            }
        }
    }

    /// Whether the active text has something to assess
    pub fn has_text(&self) -> bool {
        !self.active_text.trim().is_empty()
    }

    /// Whether the UI may edit the active text
    pub fn is_editable(&self) -> bool {
        self.mode == PracticeMode::Manual
    }

    /// Manual mode with nothing typed shows the empty-state placeholder
    pub fn placeholder_visible(&self) -> bool {
        self.mode == PracticeMode::Manual && self.active_text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> DrillPhrasePool {
        DrillPhrasePool::new(["alpha beta", "gamma delta", "epsilon zeta"]).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn test_manual_drill_manual_restores_typed_text() {
        let pool = pool();
        let mut rng = rng();

        let state = PracticeModeState::new().with_text("hello world").unwrap();
        let drill = state.with_mode(PracticeMode::Drill, &pool, &mut rng);
        assert_eq!(drill.mode, PracticeMode::Drill);
        assert!(pool.contains(&drill.active_text));
        assert_eq!(drill.current_drill_text.as_deref(), Some(drill.active_text.as_str()));

        let manual = drill.with_mode(PracticeMode::Manual, &pool, &mut rng);
        assert_eq!(manual.active_text, "hello world");
        assert_eq!(manual.last_manual_text, "hello world");
    }

    #[test]
    fn test_switching_back_to_drill_keeps_cached_phrase() {
        let pool = pool();
        let mut rng = rng();

        let drill = PracticeModeState::new().with_mode(PracticeMode::Drill, &pool, &mut rng);
        let phrase = drill.active_text.clone();

        let again = drill
            .with_mode(PracticeMode::Manual, &pool, &mut rng)
            .with_mode(PracticeMode::Drill, &pool, &mut rng);
        assert_eq!(again.active_text, phrase);
    }

    #[test]
    fn test_drill_to_drill_rolls_from_pool() {
        let pool = pool();
        let mut rng = rng();

        let mut state = PracticeModeState::new().with_mode(PracticeMode::Drill, &pool, &mut rng);
        for _ in 0..20 {
            state = state.with_mode(PracticeMode::Drill, &pool, &mut rng);
            assert!(pool.contains(&state.active_text));
            assert_eq!(state.current_drill_text.as_deref(), Some(state.active_text.as_str()));
        }
    }

    #[test]
    fn test_manual_to_manual_is_noop() {
        let pool = pool();
        let mut rng = rng();
        let state = PracticeModeState::new().with_text("keep me").unwrap();
        assert_eq!(state.with_mode(PracticeMode::Manual, &pool, &mut rng), state);
    }

    #[test]
    fn test_empty_manual_text_is_valid() {
        let pool = pool();
        let mut rng = rng();
        let manual = PracticeModeState::new()
            .with_mode(PracticeMode::Drill, &pool, &mut rng)
            .with_mode(PracticeMode::Manual, &pool, &mut rng);
        assert_eq!(manual.active_text, "");
        assert!(manual.placeholder_visible());
        assert!(!manual.has_text());
    }

    #[test]
    fn test_edit_rejected_in_drill() {
        let pool = pool();
        let mut rng = rng();
        let drill = PracticeModeState::new().with_mode(PracticeMode::Drill, &pool, &mut rng);
        assert_eq!(drill.with_text("typed"), Err(SessionError::ReferenceTextLocked));
        assert!(!drill.is_editable());
    }

    #[test]
    fn test_last_manual_text_invariant_under_mode_switches() {
        let pool = pool();
        let mut rng = rng();
        let modes = [
            PracticeMode::Drill,
            PracticeMode::Drill,
            PracticeMode::Manual,
            PracticeMode::Manual,
            PracticeMode::Drill,
            PracticeMode::Manual,
            PracticeMode::Drill,
        ];

        let mut state = PracticeModeState::new().with_text("typed once").unwrap();
        for mode in modes {
            state = state.with_mode(mode, &pool, &mut rng);
            assert_eq!(state.last_manual_text, "typed once");
            state = state.restored(&pool, &mut rng);
            assert_eq!(state.last_manual_text, "typed once");
        }
    }

    #[test]
    fn test_restored_matches_mode() {
        let pool = pool();
        let mut rng = rng();

        let manual = PracticeModeState {
            mode: PracticeMode::Manual,
            active_text: "stale".to_string(),
            last_manual_text: "fresh".to_string(),
            current_drill_text: None,
        };
        assert_eq!(manual.restored(&pool, &mut rng).active_text, "fresh");

        let drill = PracticeModeState {
            mode: PracticeMode::Drill,
            active_text: "stale".to_string(),
            last_manual_text: String::new(),
            current_drill_text: Some("gamma delta".to_string()),
        };
        assert_eq!(drill.restored(&pool, &mut rng).active_text, "gamma delta");
    }

    #[test]
    fn test_whitespace_only_text_has_no_text() {
        let state = PracticeModeState::new().with_text(" \n\t ").unwrap();
        assert!(!state.has_text());
        assert!(!state.placeholder_visible());
    }
}
