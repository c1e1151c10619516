//! Per-commit, per-file line-change extraction.
//!
//! Two passes over one `git2::Diff`: the first enumerates deltas into a
//! vector whose slot is the delta index, the second asks libgit2 for the
//! patch of each index and fills in its line counts. The delta index is the
//! only link between the passes. Rename detection runs before both, so a
//! moved file is one `Renamed` change carrying its old path.

use std::path::Path;

use git2::{Commit, Delta, Diff, DiffDelta, DiffFindOptions, DiffOptions, Patch, Repository, Tree};

use super::{ChangeStatus, Detail, FileChange};
use crate::error::Result;

/// File changes introduced by `commit` relative to its first parent
/// (root commits are compared with the empty tree).
pub fn commit_changes(
    repo: &Repository,
    commit: &Commit<'_>,
    detail: Detail,
) -> Result<Vec<FileChange>> {
    let tree = commit.tree()?;
    let parent_trees = commit
        .parents()
        .map(|p| p.tree())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut opts = DiffOptions::new();
    let mut diff = repo.diff_tree_to_tree(parent_trees.first(), Some(&tree), Some(&mut opts))?;
    // pair deletions with similar additions so moves surface as renames
    diff.find_similar(Some(DiffFindOptions::new().renames(true)))?;

    let mut changes = enumerate_files(&diff);
    if detail == Detail::Lines {
        fill_line_counts(&diff, &mut changes)?;
    }

    for change in changes.iter_mut() {
        if matches!(change.status, ChangeStatus::Added | ChangeStatus::Renamed) {
            change.created = !exists_in_any(&parent_trees, &change.path);
        }
    }

    Ok(changes)
}

/// First pass: one `FileChange` per delta, in delta order.
fn enumerate_files(diff: &Diff<'_>) -> Vec<FileChange> {
    diff.deltas().map(|delta| file_change(&delta)).collect()
}

/// Second pass: line counts looked up by delta index.
fn fill_line_counts(diff: &Diff<'_>, changes: &mut [FileChange]) -> Result<()> {
    for (idx, change) in changes.iter_mut().enumerate() {
        let Some(patch) = Patch::from_diff(diff, idx)? else {
            continue;
        };
        let (_context, additions, deletions) = patch.line_stats()?;
        change.additions = additions;
        change.deletions = deletions;
    }
    Ok(())
}

fn file_change(delta: &DiffDelta<'_>) -> FileChange {
    let new_path = delta.new_file().path().map(path_string);
    let old_path = delta.old_file().path().map(path_string);
    let status = match delta.status() {
        Delta::Added | Delta::Copied => ChangeStatus::Added,
        Delta::Deleted => ChangeStatus::Deleted,
        Delta::Modified | Delta::Typechange => ChangeStatus::Modified,
        Delta::Renamed => ChangeStatus::Renamed,
        _ => ChangeStatus::Other,
    };

    let path = new_path.clone().or_else(|| old_path.clone()).unwrap_or_default();
    let old_path = old_path.filter(|old| status == ChangeStatus::Renamed && *old != path);

    FileChange {
        path,
        old_path,
        status,
        additions: 0,
        deletions: 0,
        created: false,
    }
}

fn exists_in_any(trees: &[Tree<'_>], path: &str) -> bool {
    trees.iter().any(|t| t.get_path(Path::new(path)).is_ok())
}

fn path_string(p: &Path) -> String {
    p.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
#[path = "diff_test.rs"]
mod tests;
