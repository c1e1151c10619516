//! Result cache under `<git-dir>/commitlens-cache/`.
//!
//! One file per (subcommand, resolved range, variant). The first line is a
//! small JSON header carrying the head commit the result was computed at;
//! the payload follows. A lookup reads only the header before deciding
//! whether the payload is worth deserializing. Anything unexpected is a
//! miss, and write failures are logged and dropped.

use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::range::TimeRange;

pub const CACHE_DIR: &str = "commitlens-cache";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    subcommand: &'static str,
    range: TimeRange,
    variant: Option<String>,
}

impl CacheKey {
    pub fn new(subcommand: &'static str, range: TimeRange) -> Self {
        Self {
            subcommand,
            range,
            variant: None,
        }
    }

    /// Discriminate results that depend on more than the range (limits,
    /// thresholds, requested files). Repeated calls accumulate. Only a hash
    /// of the variant reaches the file name.
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        let variant = variant.into();
        self.variant = Some(match self.variant.take() {
            Some(prev) => format!("{prev};{variant}"),
            None => variant,
        });
        self
    }

    pub fn file_name(&self) -> String {
        let bound = |b: Option<i64>| b.map_or_else(|| "all".to_string(), |ts| ts.to_string());
        let base = format!(
            "{}-{}-{}",
            self.subcommand,
            bound(self.range.since),
            bound(self.range.until)
        );
        match &self.variant {
            Some(v) => format!("{base}-{:016x}.json", hash_str(v)),
            None => format!("{base}.json"),
        }
    }
}

fn hash_str(s: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    head: String,
    subcommand: String,
    since: Option<i64>,
    until: Option<i64>,
    computed_at: String,
}

pub struct Cache {
    dir: Option<PathBuf>,
}

impl Cache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir: Some(dir) }
    }

    pub fn for_git_dir(git_dir: &Path) -> Self {
        Self::new(git_dir.join(CACHE_DIR))
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// The cached payload for `key`, provided it was computed at `head`.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey, head: &str) -> Option<T> {
        let path = self.dir.as_ref()?.join(key.file_name());
        let file = File::open(&path).ok()?;
        let mut reader = BufReader::new(file);

        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let header: Header = match serde_json::from_str(&line) {
            Ok(h) => h,
            Err(e) => {
                tracing::debug!(path = %path.display(), "unreadable cache header: {e}");
                return None;
            }
        };
        if header.head != head || header.subcommand != key.subcommand {
            tracing::debug!(path = %path.display(), cached = %header.head, "stale cache entry");
            return None;
        }

        match serde_json::from_reader(reader) {
            Ok(payload) => {
                tracing::debug!(path = %path.display(), "cache hit");
                Some(payload)
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), "corrupt cache payload: {e}");
                None
            }
        }
    }

    /// Store `payload` for `key`, replacing any previous entry atomically.
    pub fn put<T: Serialize>(&self, key: &CacheKey, head: &str, payload: &T) {
        let Some(dir) = self.dir.as_ref() else {
            return;
        };
        if let Err(e) = write_entry(dir, key, head, payload) {
            tracing::warn!(dir = %dir.display(), "cache write failed: {e}");
        }
    }
}

fn write_entry<T: Serialize>(
    dir: &Path,
    key: &CacheKey,
    head: &str,
    payload: &T,
) -> crate::error::Result<()> {
    fs::create_dir_all(dir)?;
    let header = Header {
        head: head.to_string(),
        subcommand: key.subcommand.to_string(),
        since: key.range.since,
        until: key.range.until,
        computed_at: chrono::Utc::now().to_rfc3339(),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer(&mut tmp, &header)?;
    tmp.write_all(b"\n")?;
    serde_json::to_writer(&mut tmp, payload)?;
    tmp.flush()?;
    tmp.persist(dir.join(key.file_name()))
        .map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
