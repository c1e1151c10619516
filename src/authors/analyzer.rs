use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::classify::ClassifiedCommit;
use crate::util::{dir_prefix, percentage};

/// Concentration of a directory's commits in few authors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn sort_key(&self) -> u8 {
        match self {
            RiskLevel::Critical => 0,
            RiskLevel::High => 1,
            RiskLevel::Medium => 2,
            RiskLevel::Low => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStats {
    pub name: String,
    pub email: String,
    pub commits: usize,
    pub lines_added: usize,
    pub lines_deleted: usize,
    #[serde(skip)]
    key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryAuthors {
    pub path: String,
    pub authors: Vec<AuthorStats>,
    pub top_contributor: String,
    /// Top contributor's share of the directory's commits, in percent.
    pub top_share: f64,
    pub bus_factor: usize,
    pub total_commits: usize,
    pub risk: RiskLevel,
}

/// Smallest number of authors whose combined commits exceed half of all
/// commits. Zero for no commits.
pub fn bus_factor(commit_counts: &[usize]) -> usize {
    let mut counts = commit_counts.to_vec();
    counts.sort_unstable_by(|a, b| b.cmp(a));
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0;
    }
    let mut running = 0;
    for (i, c) in counts.iter().enumerate() {
        running += c;
        if running * 2 > total {
            return i + 1;
        }
    }
    counts.len()
}

/// Risk from per-author shares (percent), largest first.
pub fn classify_risk(shares: &[f64]) -> RiskLevel {
    let Some(&top) = shares.first() else {
        return RiskLevel::Low;
    };
    if top >= 80.0 {
        return RiskLevel::Critical;
    }
    if top >= 60.0 {
        return RiskLevel::High;
    }
    // two or three people holding most of the history
    let top_combined: f64 = shares.iter().take(3).sum();
    if shares.len() <= 3 && top_combined >= 80.0 {
        return RiskLevel::Medium;
    }
    RiskLevel::Low
}

#[derive(Default)]
struct Tally<'a> {
    authors: HashMap<&'a str, AuthorStats>,
}

impl<'a> Tally<'a> {
    fn add(&mut self, c: &'a ClassifiedCommit, added: usize, deleted: usize, new_commit: bool) {
        let stats = self
            .authors
            .entry(c.author.key.as_str())
            .or_insert_with(|| AuthorStats {
                name: c.author.name.clone(),
                email: c.author.email.clone(),
                commits: 0,
                lines_added: 0,
                lines_deleted: 0,
                key: c.author.key.clone(),
            });
        if new_commit {
            stats.commits += 1;
        }
        stats.lines_added += added;
        stats.lines_deleted += deleted;
    }

    /// Commits desc, ties by canonical key.
    fn ranked(self) -> Vec<AuthorStats> {
        let mut authors: Vec<AuthorStats> = self.authors.into_values().collect();
        authors.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.key.cmp(&b.key)));
        authors
    }
}

/// Canonical authors over all commits.
pub fn author_stats(commits: &[ClassifiedCommit]) -> Vec<AuthorStats> {
    let mut tally = Tally::default();
    for c in commits {
        let added = c.record.files.iter().map(|f| f.additions).sum();
        let deleted = c.record.files.iter().map(|f| f.deletions).sum();
        tally.add(c, added, deleted, true);
    }
    tally.ranked()
}

/// Authors per directory prefix at `depth`, riskiest directories first.
pub fn directory_authors(commits: &[ClassifiedCommit], depth: usize) -> Vec<DirectoryAuthors> {
    let mut dirs: HashMap<String, (Tally<'_>, usize, Option<usize>)> = HashMap::new();

    for (idx, c) in commits.iter().enumerate() {
        for f in &c.record.files {
            let (tally, total, last) = dirs.entry(dir_prefix(&f.path, depth)).or_default();
            let new_commit = *last != Some(idx);
            if new_commit {
                *last = Some(idx);
                *total += 1;
            }
            tally.add(c, f.additions, f.deletions, new_commit);
        }
    }

    let mut out: Vec<DirectoryAuthors> = dirs
        .into_iter()
        .map(|(path, (tally, total, _))| {
            let authors = tally.ranked();
            let counts: Vec<usize> = authors.iter().map(|a| a.commits).collect();
            let shares: Vec<f64> = counts.iter().map(|&n| percentage(n, total)).collect();
            DirectoryAuthors {
                path,
                top_contributor: authors.first().map(|a| a.name.clone()).unwrap_or_default(),
                top_share: shares.first().copied().unwrap_or(0.0),
                bus_factor: bus_factor(&counts),
                total_commits: total,
                risk: classify_risk(&shares),
                authors,
            }
        })
        .collect();

    out.sort_by(|a, b| {
        a.risk
            .sort_key()
            .cmp(&b.risk.sort_key())
            .then(b.total_commits.cmp(&a.total_commits))
            .then_with(|| a.path.cmp(&b.path))
    });
    out
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
