//! Convergence: pairs of files at HEAD whose sizes are within 10% of each
//! other, a cheap hint at copy-paste or parallel implementations.

use serde::{Deserialize, Serialize};

/// Default cap on reported pairs.
pub const DEFAULT_CONVERGENCE_LIMIT: usize = 50;

/// Files smaller than this are ignored.
pub const MIN_CONVERGENCE_BYTES: usize = 500;

/// Smallest `smaller / larger` size ratio that still pairs two files.
pub const CONVERGENCE_RATIO: f64 = 0.90;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePair {
    pub file_a: String,
    pub file_b: String,
    pub bytes_a: usize,
    pub bytes_b: usize,
    pub bytes_diff: usize,
    pub bytes_ratio: f64,
}

#[derive(Debug, Default, PartialEq)]
pub struct Convergence {
    pub pairs: Vec<ConvergencePair>,
    pub truncated: bool,
}

/// Pairs up `(path, bytes)` entries, best ratio first, keeping at most
/// `limit` pairs.
///
/// Within a pair `file_a` is the smaller file (ties keep path order).
pub fn convergence(mut sizes: Vec<(String, usize)>, limit: usize) -> Convergence {
    sizes.retain(|(_, bytes)| *bytes >= MIN_CONVERGENCE_BYTES);
    sizes.sort_by(|(pa, a), (pb, b)| a.cmp(b).then_with(|| pa.cmp(pb)));

    let mut pairs = Vec::new();
    for (i, (path_a, bytes_a)) in sizes.iter().enumerate() {
        for (path_b, bytes_b) in &sizes[i + 1..] {
            // Sorted ascending: every later entry is at least as far off.
            let ratio = *bytes_a as f64 / *bytes_b as f64;
            if ratio < CONVERGENCE_RATIO {
                break;
            }
            pairs.push(ConvergencePair {
                file_a: path_a.clone(),
                file_b: path_b.clone(),
                bytes_a: *bytes_a,
                bytes_b: *bytes_b,
                bytes_diff: bytes_b - bytes_a,
                bytes_ratio: ratio,
            });
        }
    }
    // Stable: equal ratios keep size order.
    pairs.sort_by(|a, b| b.bytes_ratio.total_cmp(&a.bytes_ratio));

    let truncated = pairs.len() > limit;
    pairs.truncate(limit);
    Convergence { pairs, truncated }
}

/// The pair cap: the configured convergence limit, lowered by a smaller
/// global `--limit`.
pub fn effective_limit(convergence_limit: usize, global: Option<usize>) -> usize {
    match global {
        Some(limit) if limit < convergence_limit => limit,
        _ => convergence_limit,
    }
}

#[cfg(test)]
#[path = "convergence_test.rs"]
mod tests;
