//! Read-only access to a local git repository.
//!
//! `GitRepo` owns the libgit2 handle; the walker, the diff analyzer and the
//! author resolver borrow it. Nothing here writes to the repository.

pub mod authors;
pub mod diff;
pub mod walker;

use std::path::{Path, PathBuf};

use git2::{ErrorCode, ObjectType, Oid, Repository, TreeWalkMode, TreeWalkResult};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::range::TimeRange;
pub use walker::CommitWalker;

pub struct GitRepo {
    repo: Repository,
    root: PathBuf,
}

/// How much of each commit's diff the walker extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    /// Paths and change status only.
    Files,
    /// Paths plus per-file added/removed line counts.
    Lines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub old_path: Option<String>,
    pub status: ChangeStatus,
    pub additions: usize,
    pub deletions: usize,
    /// The path exists in none of the commit's parents.
    pub created: bool,
}

/// One visited commit. Immutable once the walker has produced it.
#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub id: String,
    pub short_id: String,
    pub author_name: String,
    pub author_email: String,
    pub time: i64,
    pub message: String,
    pub parents: Vec<String>,
    pub files: Vec<FileChange>,
}

impl CommitRecord {
    pub fn parent_count(&self) -> usize {
        self.parents.len()
    }

    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn lines_changed(&self) -> usize {
        self.files.iter().map(|f| f.additions + f.deletions).sum()
    }

    /// The change to `path`, matching either side of a rename.
    pub fn change_for(&self, path: &str) -> Option<&FileChange> {
        self.files
            .iter()
            .find(|f| f.path == path || f.old_path.as_deref() == Some(path))
    }
}

impl GitRepo {
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|source| Error::NotARepository {
            path: path.to_path_buf(),
            source,
        })?;
        let root = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();
        tracing::debug!(git_dir = %repo.path().display(), "opened repository");
        Ok(Self { repo, root })
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Working tree root (the git dir for bare repositories).
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Commit id at the tip of the current branch, `None` for an unborn HEAD.
    pub fn head_id(&self) -> Result<Option<String>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id().to_string())),
            Err(e) if is_unborn(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Walk history from `start` (HEAD when `None`) restricted to `range`.
    pub fn walk(
        &self,
        start: Option<&str>,
        range: TimeRange,
        detail: Detail,
    ) -> Result<CommitWalker<'_>> {
        CommitWalker::new(&self.repo, start, range, detail)
    }

    /// The blob at `path` in the tree of `commit_id`, `None` when no file
    /// lives at that path.
    pub fn blob_at(&self, commit_id: &str, path: &str) -> Result<Option<BlobStat>> {
        let commit = self.repo.find_commit(Oid::from_str(commit_id)?)?;
        let tree = commit.tree()?;
        let entry = match tree.get_path(Path::new(path)) {
            Ok(e) => e,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }
        let blob = self.repo.find_blob(entry.id())?;
        Ok(Some(BlobStat {
            bytes: blob.size(),
            lines: count_lines(blob.content()),
        }))
    }

    /// The blob at `path` on HEAD.
    pub fn head_blob(&self, path: &str) -> Result<Option<BlobStat>> {
        match self.head_id()? {
            Some(head) => self.blob_at(&head, path),
            None => Ok(None),
        }
    }

    /// Every file on HEAD with its size in bytes, in tree order. Empty for an
    /// unborn HEAD.
    pub fn head_file_sizes(&self) -> Result<Vec<(String, usize)>> {
        let tree = match self.repo.head() {
            Ok(head) => head.peel_to_tree()?,
            Err(e) if is_unborn(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let odb = self.repo.odb()?;
        let mut sizes = Vec::new();
        let mut failure = None;
        tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() != Some(ObjectType::Blob) {
                return TreeWalkResult::Ok;
            }
            match odb.read_header(entry.id()) {
                Ok((size, _)) => {
                    sizes.push((format!("{dir}{}", entry.name().unwrap_or("")), size));
                    TreeWalkResult::Ok
                }
                Err(e) => {
                    failure = Some(e);
                    TreeWalkResult::Abort
                }
            }
        })?;
        match failure {
            Some(e) => Err(e.into()),
            None => Ok(sizes),
        }
    }
}

/// Size of one file version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobStat {
    pub bytes: usize,
    /// `None` for binary content (a NUL byte anywhere).
    pub lines: Option<usize>,
}

/// Line count with `str::lines` semantics, whatever the text encoding.
fn count_lines(content: &[u8]) -> Option<usize> {
    if content.contains(&0) {
        return None;
    }
    let newlines = content.iter().filter(|&&b| b == b'\n').count();
    Some(match content.last() {
        Some(&last) if last != b'\n' => newlines + 1,
        _ => newlines,
    })
}

pub(crate) fn is_unborn(e: &git2::Error) -> bool {
    matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}

pub fn short_id(oid: &Oid) -> String {
    let mut s = oid.to_string();
    s.truncate(7);
    s
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
