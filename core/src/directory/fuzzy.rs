//! Approximate string matching
//!
//! Scores the best approximate occurrence of a pattern anywhere in a text
//! (Sellers' edit distance with a free starting point), penalized by how
//! far from the expected location the occurrence starts. Lower raw scores
//! are better; a raw score of 0 is an exact occurrence at the expected
//! location.

use serde::{Deserialize, Serialize};

/// Knobs for the approximate matcher
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyOptions {
    /// Highest raw score still counted as a match (0 = exact only)
    pub threshold: f64,
    /// How many characters away from `location` cost a full point
    pub distance: usize,
    /// Where in the text a match is expected to start
    pub location: usize,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            distance: 100,
            location: 0,
        }
    }
}

/// Similarity in (0, 1] between `pattern` and its best occurrence in `text`,
/// or `None` when nothing comes within the threshold.
pub fn similarity(pattern: &str, text: &str, options: &FuzzyOptions) -> Option<f64> {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let m = pattern.len();
    let n = text.len();

    if m == 0 || n == 0 {
        return None;
    }
    if pattern == text {
        return Some(1.0);
    }

    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0; m + 1];
    let mut best: Option<f64> = None;

    for (j, &tc) in text.iter().enumerate() {
        // An occurrence may start anywhere, so row 0 is always free
        curr[0] = 0;
        for i in 1..=m {
            let cost = if pattern[i - 1] == tc { 0 } else { 1 };
            curr[i] = (prev[i] + 1).min(curr[i - 1] + 1).min(prev[i - 1] + cost);
        }

        let start = (j + 1).saturating_sub(m);
        let raw = raw_score(curr[m], m, start, options);
        if best.is_none_or(|b| raw < b) {
            best = Some(raw);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let raw = best?;
    if raw > options.threshold {
        return None;
    }

    // Prefer texts the pattern covers more of, like a field-length norm
    let coverage = m.min(n) as f64 / m.max(n) as f64;
    let score = (1.0 - raw) * (0.9 + 0.1 * coverage);
    (score > 0.0).then_some(score.min(1.0))
}

fn raw_score(errors: usize, pattern_len: usize, position: usize, options: &FuzzyOptions) -> f64 {
    let accuracy = errors as f64 / pattern_len as f64;
    let proximity = position.abs_diff(options.location);

    if options.distance == 0 {
        return if proximity == 0 { accuracy } else { 1.0 };
    }
    accuracy + proximity as f64 / options.distance as f64
}
