//! Per-repository settings from `.commitlens.toml`.
//!
//! ```toml
//! [cache]
//! enabled = true
//!
//! [patterns]
//! lookback = 5
//! cluster_window = 3600   # seconds
//! cluster_min = 3
//! convergence_limit = 50
//!
//! [hotspots]
//! depth = 1
//!
//! [authors]
//! depth = 1
//!
//! [trends]
//! windows = 4
//! window_days = 30
//!
//! [ml]
//! enabled = false
//! model_dir = "models/commit-classifier"
//! ```
//!
//! Every key is optional. Command-line flags take precedence.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = ".commitlens.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub cache: CacheConfig,
    pub patterns: PatternsConfig,
    pub hotspots: DepthConfig,
    pub authors: DepthConfig,
    pub trends: TrendsConfig,
    pub ml: MlConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternsConfig {
    /// Commits scanned back from a fix for its feat/refactor anchor.
    pub lookback: usize,
    /// Maximum span of a temporal cluster, in seconds.
    pub cluster_window: i64,
    /// Smallest run reported as a temporal cluster.
    pub cluster_min: usize,
    /// Cap on size-convergence pairs.
    pub convergence_limit: usize,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            lookback: 5,
            cluster_window: 3600,
            cluster_min: 3,
            convergence_limit: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DepthConfig {
    pub depth: usize,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self { depth: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendsConfig {
    pub windows: usize,
    pub window_days: u32,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            windows: 4,
            window_days: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MlConfig {
    pub enabled: bool,
    /// Relative paths resolve against the repository root.
    pub model_dir: Option<PathBuf>,
}

impl Config {
    /// Read `.commitlens.toml` from `root`. A missing file yields defaults;
    /// a malformed one is an error.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no {CONFIG_FILE}, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config = Self::parse(&text).map_err(|source| Error::Config {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
