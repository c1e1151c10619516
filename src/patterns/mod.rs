//! Patterns report: fix-after-feat / fix-after-refactor sequences,
//! temporal clusters and multi-edit chains over the selected history, plus
//! size convergence between files at HEAD.

pub mod convergence;
pub mod detector;

use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;
use crate::error::Result;
use crate::git::Detail;
use crate::report_helpers::print_json_stdout;
use crate::session::{Session, apply_limit};
use crate::util::is_under;
use convergence::{ConvergencePair, convergence, effective_limit};
use detector::{DetectorParams, MultiEditChain, Signal, detect};

/// Command-line overrides for the detector.
#[derive(Debug, Clone, Default)]
pub struct PatternsArgs {
    pub path: Option<String>,
    pub lookback: Option<usize>,
    pub cluster_window: Option<i64>,
    pub cluster_min: Option<usize>,
    pub convergence_limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PatternsReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub params: DetectorParams,
    pub signals: Vec<Signal>,
    pub multi_edit_chains: Vec<MultiEditChain>,
    pub convergence: Vec<ConvergencePair>,
    pub convergence_truncated: bool,
    pub convergence_limit: usize,
    pub total_commits_analyzed: usize,
}

fn params(session: &Session, args: &PatternsArgs) -> DetectorParams {
    let base = DetectorParams::from(&session.config().patterns);
    DetectorParams {
        lookback: args.lookback.unwrap_or(base.lookback),
        cluster_window: args.cluster_window.unwrap_or(base.cluster_window),
        cluster_min: args.cluster_min.unwrap_or(base.cluster_min),
    }
}

fn convergence_limit(session: &Session, args: &PatternsArgs) -> usize {
    args.convergence_limit
        .unwrap_or(session.config().patterns.convergence_limit)
}

pub fn compute(session: &Session, args: &PatternsArgs) -> Result<PatternsReport> {
    let params = params(session, args);
    let convergence_limit = convergence_limit(session, args);
    let mut commits = session.commits(session.range(), Detail::Files)?;
    commits.reverse();

    let detection = detect(&commits, &params, args.path.as_deref());
    let mut signals = detection.signals;
    let mut multi_edit_chains = detection.multi_edit_chains;
    apply_limit(&mut signals, session.limit());
    apply_limit(&mut multi_edit_chains, session.limit());

    let mut sizes = session.git().head_file_sizes()?;
    if let Some(prefix) = args.path.as_deref() {
        sizes.retain(|(path, _)| is_under(path, prefix));
    }
    let converged = convergence(sizes, effective_limit(convergence_limit, session.limit()));

    Ok(PatternsReport {
        path: args.path.clone(),
        params,
        signals,
        multi_edit_chains,
        convergence: converged.pairs,
        convergence_truncated: converged.truncated,
        convergence_limit,
        total_commits_analyzed: detection.commits_analyzed,
    })
}

pub fn run(session: &Session, args: &PatternsArgs) -> Result<()> {
    let params = params(session, args);
    let key = CacheKey::new("patterns", session.range()).with_variant(format!(
        "path={:?};lookback={};window={};min={};convergence={}",
        args.path,
        params.lookback,
        params.cluster_window,
        params.cluster_min,
        convergence_limit(session, args)
    ));
    let report = session.cached(key, |s| compute(s, args))?;
    print_json_stdout(&report)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
