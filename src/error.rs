//! Error taxonomy for the analysis engine.
//!
//! Only input errors and plumbing failures surface here. Degradable
//! conditions (missing mailmap, unavailable model, cache problems) are
//! absorbed where they happen and never become an `Error`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid --{flag} date {value:?}: {reason} (expected YYYY-MM-DD or relative like 30d, 4w, 6m, 1y)")]
    InvalidDate {
        flag: &'static str,
        value: String,
        reason: String,
    },

    #[error("--since date is after --until date (empty range)")]
    InvertedRange,

    #[error("not a git repository (or any parent): {path}: {source}")]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("git: {0}")]
    Git(#[from] git2::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
