//! Score hierarchy returned by one pronunciation assessment.
//!
//! The hierarchy is produced atomically by the assessment collaborator and
//! never mutated afterwards: overall scores, then words in reference order,
//! then each word's syllables/phonemes.

pub mod band;

pub use band::{band, ScoreBand};

use serde::{Deserialize, Serialize};

/// Overall, word and syllable scores for one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreHierarchy {
    pub overall_score: f64,
    pub accuracy_score: f64,
    pub fluency_score: f64,
    pub completeness_score: f64,
    /// Absent when the backend does not report prosody.
    #[serde(default)]
    pub prosody_score: Option<f64>,
    /// Word breakdown in reference-text order; empty when not reported.
    #[serde(default)]
    pub words: Vec<WordScore>,
}

/// Score for a single recognized word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordScore {
    #[serde(default)]
    pub text: Option<String>,
    pub accuracy_score: f64,
    #[serde(default)]
    pub syllables: Vec<SyllableScore>,
}

/// Score for a syllable or phoneme inside a word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyllableScore {
    #[serde(default)]
    pub syllable_label: Option<String>,
    #[serde(default)]
    pub grapheme_label: Option<String>,
    pub accuracy_score: f64,
}

impl ScoreHierarchy {
    /// Band of the overall pronunciation score.
    pub fn overall_band(&self) -> ScoreBand {
        band(self.overall_score)
    }

    /// Word score at `index`, or `None` past the end of the backend's words.
    pub fn word(&self, index: usize) -> Option<&WordScore> {
        self.words.get(index)
    }

    /// True when every score in the hierarchy is a finite number.
    ///
    /// A hierarchy carrying NaN or infinite values is treated as an
    /// unparseable result by the session controller.
    pub fn is_well_formed(&self) -> bool {
        let headline = [
            self.overall_score,
            self.accuracy_score,
            self.fluency_score,
            self.completeness_score,
        ];
        headline.iter().all(|score| score.is_finite())
            && self.prosody_score.map_or(true, f64::is_finite)
            && self.words.iter().all(|word| {
                word.accuracy_score.is_finite()
                    && word
                        .syllables
                        .iter()
                        .all(|syllable| syllable.accuracy_score.is_finite())
            })
    }
}

impl WordScore {
    pub fn band(&self) -> ScoreBand {
        band(self.accuracy_score)
    }

    /// Phonetic rendering of the word, e.g. `/l.ʊ.k.ɪ.ŋ/`.
    ///
    /// Uses each syllable's label, falling back to its grapheme; syllables
    /// with neither are skipped. Returns `None` when nothing is left.
    pub fn phonetic_text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .syllables
            .iter()
            .filter_map(|syllable| syllable.label())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(format!("/{}/", parts.join(".")))
        }
    }
}

impl SyllableScore {
    pub fn band(&self) -> ScoreBand {
        band(self.accuracy_score)
    }

    /// Syllable label, or the grapheme when the syllable label is absent.
    pub fn label(&self) -> Option<&str> {
        self.syllable_label
            .as_deref()
            .or(self.grapheme_label.as_deref())
    }

    /// Label for display; `"-"` when neither label is present.
    pub fn display_label(&self) -> &str {
        self.label().unwrap_or("-")
    }
}
