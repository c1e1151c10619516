//! Churn report: file volatility ranked by lines added plus removed.

pub mod analyzer;

use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;
use crate::error::Result;
use crate::git::Detail;
use crate::range::TimeRange;
use crate::report_helpers::print_json_stdout;
use crate::session::{Session, apply_limit};
use analyzer::{FileChurn, file_churn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnReport {
    pub files: Vec<FileChurn>,
    /// Files before `--limit`.
    pub total_files: usize,
    pub total_commits_analyzed: usize,
}

pub fn compute(session: &Session, range: TimeRange) -> Result<ChurnReport> {
    let commits = session.commits(range, Detail::Lines)?;
    let mut files = file_churn(&commits);
    let total_files = files.len();
    apply_limit(&mut files, session.limit());
    Ok(ChurnReport {
        files,
        total_files,
        total_commits_analyzed: commits.len(),
    })
}

pub fn run(session: &Session) -> Result<()> {
    let key = CacheKey::new("churn", session.range());
    let report = session.cached(key, |s| compute(s, s.range()))?;
    print_json_stdout(&report)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
