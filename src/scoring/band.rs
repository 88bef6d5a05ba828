// Presentation band mapping
//
// One mapping from a numeric score to a feedback tier, shared by every view
// that colors a score (overall ring, word chips, syllable rows). Lower
// edges are inclusive: 90 is Excellent, 89.99 is Good.

use serde::{Deserialize, Serialize};

/// Lower edge of the Excellent band
pub const EXCELLENT_MIN: f64 = 90.0;
/// Lower edge of the Good band
pub const GOOD_MIN: f64 = 80.0;
/// Lower edge of the Fair band
pub const FAIR_MIN: f64 = 70.0;

/// Discrete feedback tier for a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Poor,
    Fair,
    Good,
    Excellent,
}

/// Map a score to its band.
///
/// Scores are not clamped. NaN maps to `Poor`.
pub fn band(score: f64) -> ScoreBand {
    if score >= EXCELLENT_MIN {
        ScoreBand::Excellent
    } else if score >= GOOD_MIN {
        ScoreBand::Good
    } else if score >= FAIR_MIN {
        ScoreBand::Fair
    } else {
        ScoreBand::Poor
    }
}

impl ScoreBand {
    /// Color name used by the presentation layer
    pub fn color_name(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "green",
            ScoreBand::Good => "yellow",
            ScoreBand::Fair => "orange",
            ScoreBand::Poor => "red",
        }
    }

    /// Short feedback caption shown next to syllable scores
    pub fn feedback_label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Awesome!",
            ScoreBand::Good => "Good!",
            ScoreBand::Fair | ScoreBand::Poor => "Needs work",
        }
    }

    /// Whether the detail view offers extra coaching for this band
    pub fn needs_attention(&self) -> bool {
        *self != ScoreBand::Excellent
    }
}
