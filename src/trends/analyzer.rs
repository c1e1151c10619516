use serde::{Deserialize, Serialize};

use crate::range::SECONDS_PER_DAY;

/// Direction of change between the two most recent windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Relative change beyond which a value counts as moving.
pub const STABLE_BAND: f64 = 0.1;

/// Compare `latest` against `previous`. Within ±10 % is stable; growth from
/// zero is increasing.
pub fn trend(latest: f64, previous: f64) -> Trend {
    if previous == 0.0 {
        return if latest > 0.0 {
            Trend::Increasing
        } else {
            Trend::Stable
        };
    }
    let ratio = (latest - previous) / previous;
    if ratio > STABLE_BAND {
        Trend::Increasing
    } else if ratio < -STABLE_BAND {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// `(since, until)` of `count` consecutive windows of `days` ending at `end`,
/// most recent first. Each window is half-open.
pub fn window_bounds(end: i64, count: usize, days: u32) -> Vec<(i64, i64)> {
    let span = i64::from(days.max(1)) * SECONDS_PER_DAY;
    (0..count as i64)
        .map(|i| {
            let until = end - i * span;
            (until - span, until)
        })
        .collect()
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
