use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::classify::{ClassifiedCommit, CommitKind};
use crate::util::dir_prefix;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryHotspot {
    pub path: String,
    pub additions: usize,
    pub deletions: usize,
    pub total_churn: usize,
    /// Distinct commits touching the directory.
    pub commit_count: usize,
    pub file_count: usize,
    pub fix_commits: usize,
    /// Distinct commits per kind.
    pub by_kind: BTreeMap<CommitKind, usize>,
}

#[derive(Default)]
struct DirAccumulator<'a> {
    additions: usize,
    deletions: usize,
    files: BTreeSet<&'a str>,
    commits: usize,
    fix_commits: usize,
    by_kind: BTreeMap<CommitKind, usize>,
    /// Index of the last commit counted, so a commit touching several
    /// files in one directory is counted once.
    last_commit: Option<usize>,
}

/// Group churn and classification by directory prefix at `depth`.
/// Highest churn first, ties by path.
pub fn directory_hotspots(commits: &[ClassifiedCommit], depth: usize) -> Vec<DirectoryHotspot> {
    let mut dirs: HashMap<String, DirAccumulator<'_>> = HashMap::new();

    for (idx, c) in commits.iter().enumerate() {
        for f in &c.record.files {
            let acc = dirs.entry(dir_prefix(&f.path, depth)).or_default();
            acc.additions += f.additions;
            acc.deletions += f.deletions;
            acc.files.insert(f.path.as_str());

            if acc.last_commit != Some(idx) {
                acc.last_commit = Some(idx);
                acc.commits += 1;
                *acc.by_kind.entry(c.kind()).or_insert(0) += 1;
                if c.kind() == CommitKind::Fix {
                    acc.fix_commits += 1;
                }
            }
        }
    }

    let mut out: Vec<DirectoryHotspot> = dirs
        .into_iter()
        .map(|(path, acc)| DirectoryHotspot {
            path,
            additions: acc.additions,
            deletions: acc.deletions,
            total_churn: acc.additions + acc.deletions,
            commit_count: acc.commits,
            file_count: acc.files.len(),
            fix_commits: acc.fix_commits,
            by_kind: acc.by_kind,
        })
        .collect();
    out.sort_by(|a, b| b.total_churn.cmp(&a.total_churn).then_with(|| a.path.cmp(&b.path)));
    out
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
