//! Hotspots report: churn and commit kinds aggregated per directory.
//!
//! Directories are grouped at `--depth` path components; depth 0 yields a
//! single "." row for the whole repository.

pub mod analyzer;

use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;
use crate::error::Result;
use crate::git::Detail;
use crate::report_helpers::print_json_stdout;
use crate::session::{Session, apply_limit};
use analyzer::{DirectoryHotspot, directory_hotspots};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotsReport {
    pub depth: usize,
    pub directories: Vec<DirectoryHotspot>,
    /// Directories before `--limit`.
    pub total_directories: usize,
    pub total_commits_analyzed: usize,
}

pub fn compute(session: &Session, depth: usize) -> Result<HotspotsReport> {
    let commits = session.commits(session.range(), Detail::Lines)?;
    let mut directories = directory_hotspots(&commits, depth);
    let total_directories = directories.len();
    apply_limit(&mut directories, session.limit());
    Ok(HotspotsReport {
        depth,
        directories,
        total_directories,
        total_commits_analyzed: commits.len(),
    })
}

pub fn run(session: &Session, depth: Option<usize>) -> Result<()> {
    let depth = depth.unwrap_or(session.config().hotspots.depth);
    let key = CacheKey::new("hotspots", session.range()).with_variant(format!("depth={depth}"));
    let report = session.cached(key, |s| compute(s, depth))?;
    print_json_stdout(&report)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
