use git2::{Commit, Repository, Revwalk, Sort};

use super::{CommitRecord, Detail, diff, is_unborn, short_id};
use crate::error::Result;
use crate::range::TimeRange;

/// Lazy commit-graph traversal, newest first, children before parents.
///
/// The iterator is finite and cannot be restarted. It stops at the first
/// commit older than `range.since` and skips commits at or after
/// `range.until`.
pub struct CommitWalker<'repo> {
    repo: &'repo Repository,
    revwalk: Option<Revwalk<'repo>>,
    range: TimeRange,
    detail: Detail,
}

impl<'repo> CommitWalker<'repo> {
    pub fn new(
        repo: &'repo Repository,
        start: Option<&str>,
        range: TimeRange,
        detail: Detail,
    ) -> Result<Self> {
        range.validate()?;

        let tip = match start {
            Some(spec) => Some(repo.revparse_single(spec)?.peel_to_commit()?.id()),
            None => match repo.head() {
                Ok(head) => Some(head.peel_to_commit()?.id()),
                Err(e) if is_unborn(&e) => None,
                Err(e) => return Err(e.into()),
            },
        };

        let revwalk = match tip {
            Some(oid) => {
                let mut revwalk = repo.revwalk()?;
                revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
                revwalk.push(oid)?;
                Some(revwalk)
            }
            None => {
                tracing::debug!("HEAD is unborn, nothing to walk");
                None
            }
        };

        Ok(Self {
            repo,
            revwalk,
            range,
            detail,
        })
    }

    fn record(&self, commit: &Commit<'_>) -> Result<CommitRecord> {
        let author = commit.author();
        Ok(CommitRecord {
            id: commit.id().to_string(),
            short_id: short_id(&commit.id()),
            author_name: author.name().unwrap_or("unknown").to_string(),
            author_email: author.email().unwrap_or("unknown").to_string(),
            time: commit.time().seconds(),
            message: commit.message().unwrap_or("").to_string(),
            parents: commit.parent_ids().map(|p| p.to_string()).collect(),
            files: diff::commit_changes(self.repo, commit, self.detail)?,
        })
    }
}

impl Iterator for CommitWalker<'_> {
    type Item = Result<CommitRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let oid = match self.revwalk.as_mut()?.next()? {
                Ok(oid) => oid,
                Err(e) => return Some(Err(e.into())),
            };
            let commit = match self.repo.find_commit(oid) {
                Ok(c) => c,
                Err(e) => return Some(Err(e.into())),
            };
            let ts = commit.time().seconds();

            if self.range.is_before_start(ts) {
                self.revwalk = None;
                return None;
            }
            if !self.range.contains(ts) {
                continue;
            }

            return Some(self.record(&commit));
        }
    }
}

#[cfg(test)]
#[path = "walker_test.rs"]
mod tests;
