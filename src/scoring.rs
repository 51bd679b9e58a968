use serde::{Deserialize, Serialize};

/// Result of grading one submission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub wpm: f64,
    pub accuracy: f64,
    pub elapsed_secs: f64,
}

/// Grade `input` against `reference`, typed over `elapsed_secs`.
///
/// Accuracy is a positional comparison: character `i` of the input is checked
/// against character `i` of the reference and nothing is realigned, so a single
/// skipped character marks the rest of the line wrong. Input past the end of
/// the reference is ignored.
pub fn score(reference: &str, input: &str, elapsed_secs: f64) -> Score {
    Score {
        wpm: words_per_minute(word_count(input), elapsed_secs),
        accuracy: char_accuracy(reference, input),
        elapsed_secs,
    }
}

pub fn word_count(input: &str) -> usize {
    input.split_whitespace().count()
}

pub fn words_per_minute(words: usize, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 {
        words as f64 / (elapsed_secs / 60.0)
    } else {
        0.0
    }
}

pub fn char_accuracy(reference: &str, input: &str) -> f64 {
    let reference_len = reference.chars().count();
    if reference_len == 0 {
        return 0.0;
    }

    let matches = reference
        .chars()
        .zip(input.chars())
        .filter(|(expected, typed)| expected == typed)
        .count();

    matches as f64 / reference_len as f64 * 100.0
}
