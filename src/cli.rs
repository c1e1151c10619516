//! CLI argument definitions for the `clens` command.
//!
//! Global flags select the repository, the time range and the shared
//! pipeline options; each subcommand adds its own knobs. Subcommand flags
//! left unset fall back to `.commitlens.toml`, then to built-in defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::session::Options;

#[derive(Parser)]
#[command(
    name = "clens",
    version,
    about = "Commit history analytics for git repositories"
)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every subcommand.
#[derive(Args)]
pub struct CommonArgs {
    /// Repository to analyze (default: current directory)
    #[arg(long, global = true, default_value = ".")]
    pub repo: PathBuf,

    /// Only commits on or after this day (YYYY-MM-DD, or 30d / 4w / 6m / 1y)
    #[arg(long, global = true)]
    pub since: Option<String>,

    /// Only commits on or before this day (YYYY-MM-DD, or 30d / 4w / 6m / 1y)
    #[arg(long, global = true)]
    pub until: Option<String>,

    /// Cap ranked output lists at N entries
    #[arg(long, global = true)]
    pub limit: Option<usize>,

    /// Bypass the result cache for this run
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Let a trained text model classify commits the rules leave as "other"
    #[arg(long, global = true)]
    pub ml: bool,

    /// Model directory: model.onnx + tokenizer.json (needs the `ml` feature)
    /// or model.json + vectorizer.json, each with label_mapping.json
    #[arg(long, global = true)]
    pub model_dir: Option<PathBuf>,
}

impl CommonArgs {
    pub fn options(&self) -> Options {
        Options {
            since: self.since.clone(),
            until: self.until.clone(),
            limit: self.limit,
            no_cache: self.no_cache,
            ml: self.ml,
            model_dir: self.model_dir.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Commit-type distribution, daily activity, velocity and ticket references
    Metrics,

    /// Files ranked by lines added plus removed
    Churn,

    /// Per-file history: creation, growth, shrinkage, deletion
    Lifecycle {
        /// Repository-relative paths to trace
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Detect fixes following features or refactors, bursts of same-type
    /// commits and files edited over and over
    #[command(long_about = "\
Detect fixes following features or refactors, bursts of same-type commits
and files edited over and over.

Signals:
  fix_after_feat      a fix within the next LOOKBACK commits shares a file
                      with a feat commit
  fix_after_refactor  same, after a refactor commit
  temporal_cluster    at least CLUSTER_MIN commits of one type within
                      CLUSTER_WINDOW seconds

Multi-edit chains list files touched by three or more commits.
Convergence pairs files at HEAD (500 bytes or more) whose sizes are within
10% of each other, closest first.")]
    Patterns {
        /// Only consider commits touching this directory
        #[arg(long)]
        path: Option<String>,

        /// Commits after a feat/refactor examined for fixes (default: 5)
        #[arg(long)]
        lookback: Option<usize>,

        /// Temporal cluster window in seconds (default: 3600)
        #[arg(long)]
        cluster_window: Option<i64>,

        /// Minimum commits in a temporal cluster (default: 3)
        #[arg(long)]
        cluster_min: Option<usize>,

        /// Maximum convergence pairs reported (default: 50)
        #[arg(long)]
        convergence_limit: Option<usize>,
    },

    /// Directories ranked by churn, with fix counts and type breakdown
    Hotspots {
        /// Directory depth for aggregation (default: 1)
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Contributors, bus factor and per-directory ownership risk
    #[command(long_about = "\
Contributors, bus factor and per-directory ownership risk.

Aliases are merged through the repository .mailmap.

Risk levels:
  CRITICAL  one author holds 80% or more of a directory's commits
  HIGH      one author holds 60% or more
  MEDIUM    at most three authors, together 80% or more
  LOW       knowledge is spread out")]
    Authors {
        /// Directory depth for aggregation (default: 1)
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Metrics over consecutive windows ending today, latest two compared
    Trends {
        /// Number of windows (default: 4)
        #[arg(long)]
        windows: Option<usize>,

        /// Days per window (default: 30)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        window_days: Option<u32>,
    },
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
