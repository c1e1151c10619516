//! Trends report: the metrics and churn primitives over consecutive
//! fixed-size windows ending today, with the latest two windows compared.

pub mod analyzer;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;
use crate::classify::CommitKind;
use crate::churn::analyzer::file_churn;
use crate::error::Result;
use crate::git::Detail;
use crate::metrics::analyzer::{KindCount, summarize};
use crate::range::{SECONDS_PER_DAY, TimeRange, format_day};
use crate::report_helpers::print_json_stdout;
use crate::session::Session;
use crate::util::{percentage, round1};
use analyzer::{Trend, trend, window_bounds};

/// Top churn files listed per window unless `--limit` says otherwise.
const TOP_CHURN_FILES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendWindow {
    /// 0 is the most recent window.
    pub index: usize,
    pub label: String,
    /// First day in the window.
    pub since: String,
    /// Last day in the window.
    pub until: String,
    pub total_commits: usize,
    pub commit_types: Vec<KindCount>,
    /// Commits per day.
    pub velocity: f64,
    /// Share of fix commits, in percent.
    pub fix_rate: f64,
    pub top_churn_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deltas {
    pub commit_trend: Trend,
    pub fix_rate_trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendsReport {
    pub window_count: usize,
    pub window_days: u32,
    pub windows: Vec<TrendWindow>,
    pub deltas: Deltas,
}

#[derive(Debug, Clone, Copy)]
pub struct TrendsArgs {
    pub windows: Option<usize>,
    pub window_days: Option<u32>,
}

/// Start of the UTC day after today: the exclusive end of the latest window.
fn end_of_today() -> i64 {
    let now = Utc::now().timestamp();
    now - now.rem_euclid(SECONDS_PER_DAY) + SECONDS_PER_DAY
}

/// Windows ending at `end` (unix seconds, exclusive), one walk per window.
pub fn compute_at(session: &Session, count: usize, days: u32, end: i64) -> Result<TrendsReport> {
    let days = days.max(1);
    let top = session.limit().unwrap_or(TOP_CHURN_FILES);
    let mut windows = Vec::with_capacity(count);

    for (index, (since, until)) in window_bounds(end, count, days).into_iter().enumerate() {
        let commits = session.commits(TimeRange::between(since, until), Detail::Lines)?;
        let metrics = summarize(&commits, session.classifier().mode());
        let top_churn_files = file_churn(&commits)
            .into_iter()
            .take(top)
            .map(|f| f.path)
            .collect();

        let first = format_day(since);
        let last = format_day(until - 1);
        tracing::debug!(index, since = %first, until = %last, commits = commits.len(), "trend window");
        windows.push(TrendWindow {
            index,
            label: format!("{first}..{last}"),
            since: first,
            until: last,
            total_commits: metrics.total_commits,
            fix_rate: percentage(metrics.count(CommitKind::Fix), metrics.total_commits),
            velocity: round1(metrics.total_commits as f64 / f64::from(days)),
            commit_types: metrics.commit_types,
            top_churn_files,
        });
    }

    let deltas = match windows.as_slice() {
        [latest, previous, ..] => Deltas {
            commit_trend: trend(latest.total_commits as f64, previous.total_commits as f64),
            fix_rate_trend: trend(latest.fix_rate, previous.fix_rate),
        },
        _ => Deltas {
            commit_trend: Trend::Stable,
            fix_rate_trend: Trend::Stable,
        },
    };

    Ok(TrendsReport {
        window_count: count,
        window_days: days,
        windows,
        deltas,
    })
}

pub fn run(session: &Session, args: TrendsArgs) -> Result<()> {
    let count = args.windows.unwrap_or(session.config().trends.windows);
    let days = args.window_days.unwrap_or(session.config().trends.window_days);
    let end = end_of_today();
    let span = i64::from(days.max(1)) * SECONDS_PER_DAY * count as i64;

    let key = CacheKey::new("trends", TimeRange::between(end - span, end))
        .with_variant(format!("windows={count};days={days}"));
    let report = session.cached(key, |s| compute_at(s, count, days, end))?;
    print_json_stdout(&report)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
