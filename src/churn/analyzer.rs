use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::classify::ClassifiedCommit;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChurn {
    pub path: String,
    pub additions: usize,
    pub deletions: usize,
    pub total_churn: usize,
    pub commit_count: usize,
}

/// Per-file added/removed lines and touching commits, highest churn first.
/// Ties break on commit count, then path.
pub fn file_churn(commits: &[ClassifiedCommit]) -> Vec<FileChurn> {
    let mut by_path: HashMap<&str, FileChurn> = HashMap::new();
    for c in commits {
        for f in &c.record.files {
            let entry = by_path.entry(f.path.as_str()).or_insert_with(|| FileChurn {
                path: f.path.clone(),
                additions: 0,
                deletions: 0,
                total_churn: 0,
                commit_count: 0,
            });
            entry.additions += f.additions;
            entry.deletions += f.deletions;
            entry.total_churn += f.additions + f.deletions;
            entry.commit_count += 1;
        }
    }

    let mut files: Vec<FileChurn> = by_path.into_values().collect();
    files.sort_by(|a, b| {
        b.total_churn
            .cmp(&a.total_churn)
            .then(b.commit_count.cmp(&a.commit_count))
            .then_with(|| a.path.cmp(&b.path))
    });
    files
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
