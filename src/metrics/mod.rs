//! Metrics report: commit-type distribution, daily activity, velocity and
//! ticket references for the selected history.

pub mod analyzer;

use crate::cache::CacheKey;
use crate::error::Result;
use crate::git::Detail;
use crate::range::TimeRange;
use crate::report_helpers::print_json_stdout;
use crate::session::{Session, apply_limit};
use analyzer::{Metrics, summarize};

/// Metrics over `range`, with `--limit` applied to the activity and ticket
/// lists. The kind distribution is always complete.
pub fn compute(session: &Session, range: TimeRange) -> Result<Metrics> {
    let commits = session.commits(range, Detail::Lines)?;
    let mut metrics = summarize(&commits, session.classifier().mode());
    apply_limit(&mut metrics.activity, session.limit());
    apply_limit(&mut metrics.ticket_refs, session.limit());
    Ok(metrics)
}

pub fn run(session: &Session) -> Result<()> {
    let key = CacheKey::new("metrics", session.range());
    let metrics = session.cached(key, |s| compute(s, s.range()))?;
    print_json_stdout(&metrics)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
