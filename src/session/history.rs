//! Bounded history of completed attempts.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::scoring::{band, ScoreBand, ScoreHierarchy};

/// Summary of one completed attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub generation: u64,
    pub reference_text: String,
    pub language: String,
    pub overall_score: f64,
    pub accuracy_score: f64,
    pub fluency_score: f64,
    pub completeness_score: f64,
    pub prosody_score: Option<f64>,
    pub band: ScoreBand,
    /// Recording time observed by the session timer
    pub duration_ms: u64,
}

impl AttemptSummary {
    pub fn new(
        generation: u64,
        reference_text: &str,
        language: &str,
        scores: &ScoreHierarchy,
        duration_ms: u64,
    ) -> Self {
        Self {
            generation,
            reference_text: reference_text.to_string(),
            language: language.to_string(),
            overall_score: scores.overall_score,
            accuracy_score: scores.accuracy_score,
            fluency_score: scores.fluency_score,
            completeness_score: scores.completeness_score,
            prosody_score: scores.prosody_score,
            band: band(scores.overall_score),
            duration_ms,
        }
    }
}

/// Newest-last ring of attempt summaries
#[derive(Debug, Clone)]
pub struct PracticeHistory {
    entries: VecDeque<AttemptSummary>,
    capacity: usize,
}

impl PracticeHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, summary: AttemptSummary) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(summary);
    }

    /// Most recent completed attempt
    pub fn last(&self) -> Option<&AttemptSummary> {
        self.entries.back()
    }

    pub fn entries(&self) -> Vec<AttemptSummary> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(generation: u64, overall: f64) -> AttemptSummary {
        let scores = ScoreHierarchy {
            overall_score: overall,
            accuracy_score: overall,
            fluency_score: overall,
            completeness_score: 100.0,
            prosody_score: Some(75.0),
            words: Vec::new(),
        };
        AttemptSummary::new(generation, "hello world", "en-US", &scores, 1200)
    }

    #[test]
    fn test_summary_copies_scores() {
        let s = summary(1, 91.0);
        assert_eq!(s.band, ScoreBand::Excellent);
        assert_eq!(s.prosody_score, Some(75.0));
        assert_eq!(s.duration_ms, 1200);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = PracticeHistory::new(2);
        history.push(summary(1, 60.0));
        history.push(summary(2, 70.0));
        history.push(summary(3, 80.0));

        assert_eq!(history.len(), 2);
        let generations: Vec<u64> = history.entries().iter().map(|s| s.generation).collect();
        assert_eq!(generations, vec![2, 3]);
        assert_eq!(history.last().map(|s| s.generation), Some(3));
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut history = PracticeHistory::new(0);
        history.push(summary(1, 60.0));
        history.push(summary(2, 65.0));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.last().map(|s| s.generation), Some(2));
    }
}
