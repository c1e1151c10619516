//! Shared analysis pipeline for one invocation.
//!
//! A `Session` owns the repository handle and the per-invocation services
//! (config, cache, classifier, author resolver) and hands compositors
//! classified commits and cached results.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{Cache, CacheKey};
use crate::classify::{ClassifiedCommit, Classifier};
use crate::config::Config;
use crate::error::Result;
use crate::git::authors::AuthorResolver;
use crate::git::{CommitRecord, Detail, GitRepo};
use crate::range::TimeRange;

/// Invocation-wide options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub since: Option<String>,
    pub until: Option<String>,
    pub limit: Option<usize>,
    pub no_cache: bool,
    pub ml: bool,
    pub model_dir: Option<PathBuf>,
}

pub struct Session {
    git: GitRepo,
    config: Config,
    cache: Cache,
    classifier: Classifier,
    authors: AuthorResolver,
    range: TimeRange,
    limit: Option<usize>,
}

impl Session {
    pub fn open(repo_path: &Path, options: &Options) -> Result<Self> {
        let range = TimeRange::parse(options.since.as_deref(), options.until.as_deref())?;
        let git = GitRepo::open(repo_path)?;
        let config = Config::load(git.root())?;

        let cache = if options.no_cache || !config.cache.enabled {
            tracing::debug!("result cache disabled");
            Cache::disabled()
        } else {
            Cache::for_git_dir(git.git_dir())
        };

        let classifier = if options.ml || config.ml.enabled {
            let model_dir = options.model_dir.clone().or_else(|| {
                config.ml.model_dir.as_ref().map(|dir| git.root().join(dir))
            });
            match model_dir {
                Some(dir) => Classifier::from_model_dir(&dir),
                None => {
                    tracing::warn!("--ml given without --model-dir or [ml] model_dir, using rules only");
                    Classifier::rules_only()
                }
            }
        } else {
            Classifier::rules_only()
        };

        Ok(Self::from_parts(git, config, cache, classifier, range, options.limit))
    }

    /// Assemble a session from already-built parts.
    pub fn from_parts(
        git: GitRepo,
        config: Config,
        cache: Cache,
        classifier: Classifier,
        range: TimeRange,
        limit: Option<usize>,
    ) -> Self {
        let authors = AuthorResolver::from_repo(git.repository());
        Self {
            git,
            config,
            cache,
            classifier,
            authors,
            range,
            limit,
        }
    }

    pub fn git(&self) -> &GitRepo {
        &self.git
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Range resolved from `--since` / `--until`.
    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Every commit in `range`, newest first, classified and attributed.
    pub fn commits(&self, range: TimeRange, detail: Detail) -> Result<Vec<ClassifiedCommit>> {
        let mut out = Vec::new();
        for record in self.git.walk(None, range, detail)? {
            out.push(self.classify(record?));
        }
        tracing::debug!(count = out.len(), "walked commits");
        Ok(out)
    }

    pub fn classify(&self, record: CommitRecord) -> ClassifiedCommit {
        let class = self
            .classifier
            .classify(&record.message, record.parent_count());
        let author = self
            .authors
            .resolve(&record.author_name, &record.author_email);
        ClassifiedCommit {
            record,
            author,
            class,
        }
    }

    /// Cached result for `key`, computing and storing it on a miss. The
    /// classifier mode and `--limit` are part of every key.
    pub fn cached<T, F>(&self, key: CacheKey, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&Self) -> Result<T>,
    {
        let key = key.with_variant(format!(
            "mode={};limit={:?}",
            self.classifier.mode(),
            self.limit
        ));

        if !self.cache.is_enabled() {
            return compute(self);
        }
        let Some(head) = self.git.head_id()? else {
            return compute(self);
        };
        if let Some(hit) = self.cache.get(&key, &head) {
            return Ok(hit);
        }

        let value = compute(self)?;
        self.cache.put(&key, &head, &value);
        Ok(value)
    }
}

/// Truncate a ranked list to `limit`.
pub fn apply_limit<T>(items: &mut Vec<T>, limit: Option<usize>) {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
