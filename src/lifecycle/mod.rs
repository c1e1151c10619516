//! Lifecycle report: the history of individual files across commits,
//! with their size at each step and whether they survive at HEAD.

use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;
use crate::error::Result;
use crate::git::{ChangeStatus, Detail, FileChange};
use crate::range::format_day;
use crate::report_helpers::print_json_stdout;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Created,
    Deleted,
    Modified,
    Grown,
    Shrunk,
    Touched,
}

impl FileStatus {
    /// Status of the tracked `path` in `change`. A rename away from the
    /// path ends it; a rename onto a new path starts it.
    fn of(change: &FileChange, path: &str) -> Self {
        if change.path != path || change.status == ChangeStatus::Deleted {
            return FileStatus::Deleted;
        }
        if change.created {
            return FileStatus::Created;
        }
        match (change.additions > 0, change.deletions > 0) {
            (true, true) => FileStatus::Modified,
            (true, false) => FileStatus::Grown,
            (false, true) => FileStatus::Shrunk,
            (false, false) => FileStatus::Touched,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSnapshot {
    pub commit: String,
    pub date: String,
    pub message: String,
    /// Line count at this commit, `None` when absent or binary.
    pub lines: Option<usize>,
    pub additions: usize,
    pub deletions: usize,
    pub net_change: i64,
    pub status: FileStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileLifecycle {
    pub path: String,
    pub exists: bool,
    pub current_lines: Option<usize>,
    /// Newest first.
    pub history: Vec<FileSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleReport {
    pub files: Vec<FileLifecycle>,
}

pub fn compute(session: &Session, files: &[String]) -> Result<LifecycleReport> {
    let git = session.git();
    let mut tracked: Vec<FileLifecycle> = Vec::with_capacity(files.len());
    for path in files {
        let head = git.head_blob(path)?;
        tracked.push(FileLifecycle {
            path: path.clone(),
            exists: head.is_some(),
            current_lines: head.and_then(|b| b.lines),
            history: Vec::new(),
        });
    }

    for record in git.walk(None, session.range(), Detail::Lines)? {
        let record = record?;
        for file in tracked.iter_mut() {
            let Some(change) = record.change_for(&file.path) else {
                continue;
            };
            let lines = git.blob_at(&record.id, &file.path)?.and_then(|b| b.lines);
            let status = FileStatus::of(change, &file.path);
            let (additions, deletions) = if change.path == file.path {
                (change.additions, change.deletions)
            } else {
                // moved away: every line leaves the tracked path
                let before = match record.parents.first() {
                    Some(parent) => git.blob_at(parent, &file.path)?.and_then(|b| b.lines),
                    None => None,
                };
                (0, before.unwrap_or(change.deletions))
            };
            file.history.push(FileSnapshot {
                commit: record.short_id.clone(),
                date: format_day(record.time),
                message: record.summary().to_string(),
                lines,
                additions,
                deletions,
                net_change: additions as i64 - deletions as i64,
                status,
            });
        }
    }

    Ok(LifecycleReport { files: tracked })
}

pub fn run(session: &Session, files: &[String]) -> Result<()> {
    let mut sorted = files.to_vec();
    sorted.sort();
    let key = CacheKey::new("lifecycle", session.range())
        .with_variant(format!("files={}", sorted.join("\u{0}")));
    let report = session.cached(key, |s| compute(s, files))?;
    print_json_stdout(&report)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
