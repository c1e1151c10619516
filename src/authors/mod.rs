//! Authors report: canonical contributors, global bus factor and
//! per-directory ownership concentration.
//!
//! Risk levels per directory: Critical (one author ≥ 80% of commits), High
//! (≥ 60%), Medium (at most three authors together ≥ 80%), Low otherwise.

pub mod analyzer;

use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;
use crate::error::Result;
use crate::git::Detail;
use crate::report_helpers::print_json_stdout;
use crate::session::{Session, apply_limit};
use analyzer::{AuthorStats, DirectoryAuthors, author_stats, bus_factor, directory_authors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorsReport {
    pub depth: usize,
    pub authors: Vec<AuthorStats>,
    /// Authors before `--limit`.
    pub total_authors: usize,
    pub bus_factor: usize,
    pub directories: Vec<DirectoryAuthors>,
    pub total_commits_analyzed: usize,
}

pub fn compute(session: &Session, depth: usize) -> Result<AuthorsReport> {
    let commits = session.commits(session.range(), Detail::Lines)?;

    let mut authors = author_stats(&commits);
    let counts: Vec<usize> = authors.iter().map(|a| a.commits).collect();
    let total_authors = authors.len();
    let mut directories = directory_authors(&commits, depth);

    apply_limit(&mut authors, session.limit());
    apply_limit(&mut directories, session.limit());

    Ok(AuthorsReport {
        depth,
        authors,
        total_authors,
        bus_factor: bus_factor(&counts),
        directories,
        total_commits_analyzed: commits.len(),
    })
}

pub fn run(session: &Session, depth: Option<usize>) -> Result<()> {
    let depth = depth.unwrap_or(session.config().authors.depth);
    let key = CacheKey::new("authors", session.range()).with_variant(format!("depth={depth}"));
    let report = session.cached(key, |s| compute(s, depth))?;
    print_json_stdout(&report)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
