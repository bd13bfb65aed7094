//! Lexical similarity between follow-up questions
//!
//! Word-set overlap: lower-case both strings, split on whitespace, and divide
//! the size of the intersection by the size of the larger set.

use std::collections::HashSet;

/// Overlap above which a question counts as a repeat
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

fn tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Word-set overlap in `[0, 1]`. Returns 0 when either side has no tokens.
#[allow(clippy::cast_precision_loss)] // token counts are tiny
pub fn score(a: &str, b: &str) -> f64 {
    let left = tokens(a);
    let right = tokens(b);
    let larger = left.len().max(right.len());
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    shared as f64 / larger as f64
}

/// Whether `candidate` overlaps any of `previous` by more than the threshold
pub fn is_repeat<'a>(candidate: &str, previous: impl IntoIterator<Item = &'a String>) -> bool {
    previous
        .into_iter()
        .any(|asked| score(candidate, asked) > SIMILARITY_THRESHOLD)
}
