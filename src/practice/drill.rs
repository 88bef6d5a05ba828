// DrillPhrasePool - randomly selected practice phrases
//
// Selection is uniform over the whole pool with repeats permitted; the
// previous phrase is not excluded.

use rand::Rng;

use crate::error::SessionError;

/// Built-in tongue twister pool used when the config does not override it
pub const DEFAULT_DRILL_PHRASES: &[&str] = &[
    "She sells seashells by the seashore.",
    "Peter Piper picked a peck of pickled peppers.",
    "How much wood would a woodchuck chuck if a woodchuck could chuck wood?",
    "Red lorry, yellow lorry.",
    "Unique New York, you know you need unique New York.",
    "Fred fed Ted bread, and Ted fed Fred bread.",
    "I scream, you scream, we all scream for ice cream.",
    "Six slippery snails slid slowly seaward.",
    "Betty Botter bought some butter, but she said the butter's bitter.",
    "A proper copper coffee pot.",
    "Truly rural, truly rural, truly rural.",
    "The thirty-three thieves thought that they thrilled the throne throughout Thursday.",
];

/// Fixed, non-empty pool of drill phrases
#[derive(Debug, Clone, PartialEq)]
pub struct DrillPhrasePool {
    phrases: Vec<String>,
}

impl DrillPhrasePool {
    /// Create a pool from the given phrases
    ///
    /// Blank phrases are dropped. Returns `EmptyDrillPool` if nothing is left.
    pub fn new<I, S>(phrases: I) -> Result<Self, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(Into::into)
            .filter(|phrase| !phrase.trim().is_empty())
            .collect();

        if phrases.is_empty() {
            return Err(SessionError::EmptyDrillPool);
        }

        Ok(Self { phrases })
    }

    /// Pool with the built-in tongue twisters
    pub fn builtin() -> Self {
        Self {
            phrases: DEFAULT_DRILL_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Pick a phrase uniformly at random
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        let index = rng.gen_range(0..self.phrases.len());
        &self.phrases[index]
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.phrases.iter().any(|p| p == phrase)
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for DrillPhrasePool {
    fn default() -> Self {
        Self::builtin()
    }
}
