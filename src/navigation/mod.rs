//! Score navigation over a completed assessment.
//!
//! The navigable words come from splitting the reference text used for the
//! assessment on single spaces, not from the backend's word array. Score
//! lookups reuse the same index into the backend array; an index past its
//! end yields no score rather than an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::scoring::{ScoreBand, ScoreHierarchy, SyllableScore, WordScore};

/// Word cursor and detail-sheet visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavigatorState {
    pub current_word_index: usize,
    pub detail_open: bool,
}

/// Cursor over the words of a completed assessment
#[derive(Debug, Clone)]
pub struct ScoreNavigator {
    reference_words: Vec<String>,
    scores: Arc<ScoreHierarchy>,
    state: NavigatorState,
}

/// Render-ready view of the current word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigatorView {
    pub state: NavigatorState,
    pub word_count: usize,
    pub current_word: String,
    pub word_score: Option<f64>,
    pub word_band: Option<ScoreBand>,
    pub phonetic_text: Option<String>,
    pub syllables: Vec<SyllableScore>,
}

/// Split reference text into navigable words.
///
/// Splits on single spaces, so consecutive spaces produce empty words.
/// Always yields at least one element.
pub fn reference_words(reference_text: &str) -> Vec<String> {
    reference_text.split(' ').map(str::to_string).collect()
}

impl ScoreNavigator {
    pub fn new(reference_text: &str, scores: Arc<ScoreHierarchy>) -> Self {
        Self {
            reference_words: reference_words(reference_text),
            scores,
            state: NavigatorState::default(),
        }
    }

    pub fn state(&self) -> NavigatorState {
        self.state
    }

    pub fn scores(&self) -> &Arc<ScoreHierarchy> {
        &self.scores
    }

    /// Number of navigable words (reference-text split)
    pub fn word_count(&self) -> usize {
        self.reference_words.len()
    }

    /// Open the detail view on `index`
    ///
    /// Out-of-range indices are rejected without changing state.
    pub fn select_word(&mut self, index: usize) -> Result<(), SessionError> {
        let len = self.word_count();
        if index >= len {
            return Err(SessionError::WordIndexOutOfRange { index, len });
        }
        self.state = NavigatorState {
            current_word_index: index,
            detail_open: true,
        };
        Ok(())
    }

    /// Advance to the next word, wrapping from the last to the first
    pub fn next_word(&mut self) {
        let len = self.word_count();
        if len == 0 {
            return;
        }
        self.state.current_word_index = (self.state.current_word_index + 1) % len;
    }

    /// Step back one word, wrapping from the first to the last
    pub fn previous_word(&mut self) {
        let len = self.word_count();
        if len == 0 {
            return;
        }
        self.state.current_word_index = if self.state.current_word_index == 0 {
            len - 1
        } else {
            self.state.current_word_index - 1
        };
    }

    pub fn close_detail(&mut self) {
        self.state.detail_open = false;
    }

    /// Reference word under the cursor
    pub fn current_word(&self) -> &str {
        self.reference_words
            .get(self.state.current_word_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Backend score for the word under the cursor, if the backend has one
    pub fn current_word_score(&self) -> Option<&WordScore> {
        self.scores.word(self.state.current_word_index)
    }

    pub fn view(&self) -> NavigatorView {
        let word_score = self.current_word_score();
        NavigatorView {
            state: self.state,
            word_count: self.word_count(),
            current_word: self.current_word().to_string(),
            word_score: word_score.map(|word| word.accuracy_score),
            word_band: word_score.map(WordScore::band),
            phonetic_text: word_score.and_then(WordScore::phonetic_text),
            syllables: word_score
                .map(|word| word.syllables.clone())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests;
