//! Heuristic 0–100 scores for a learner message.
//!
//! Inputs are plain counts: words, sentences (`[.!?]+` runs, at least one),
//! corrections and distinct lower-cased words. No model backs these numbers.
//!
//! - accuracy         = clamp(100 - corrections/sentences * 20, 30, 95)
//! - fluency          = min(90, 50 + words/sentences * 3)
//! - grammar_accuracy = 90, or max(40, 90 - 15 * corrections)
//! - vocabulary_usage = min(85, 40 + 3 * distinct words)

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::{Correction, Metrics};

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence regex"));

/// Counts the estimator works from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextStats {
    pub words: usize,
    pub sentences: usize,
    pub distinct_words: usize,
}

impl TextStats {
    pub fn of(message: &str) -> Self {
        let words = message.split_whitespace().count();
        let sentences = SENTENCE_END.find_iter(message).count().max(1);
        let distinct_words = message
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<HashSet<_>>()
            .len();
        Self {
            words,
            sentences,
            distinct_words,
        }
    }
}

/// Score a message given the corrections already found for it.
pub fn estimate_metrics(message: &str, corrections: &[Correction]) -> Metrics {
    let stats = TextStats::of(message);
    let n = corrections.len() as f64;
    let sentences = stats.sentences as f64;

    let accuracy = (100.0 - (n / sentences) * 20.0).clamp(30.0, 95.0);
    let fluency = (50.0 + (stats.words as f64 / sentences) * 3.0).min(90.0);
    let grammar_accuracy = if corrections.is_empty() {
        90.0
    } else {
        (90.0 - n * 15.0).max(40.0)
    };
    let vocabulary_usage = (40.0 + stats.distinct_words as f64 * 3.0).min(85.0);

    Metrics {
        accuracy: to_score(accuracy),
        fluency: to_score(fluency),
        grammar_accuracy: to_score(grammar_accuracy),
        vocabulary_usage: to_score(vocabulary_usage),
    }
}

/// Round and clamp into [0,100]. Non-finite input scores 0.
pub fn to_score(x: f64) -> u8 {
    if !x.is_finite() {
        return 0;
    }
    x.round().clamp(0.0, 100.0) as u8
}
