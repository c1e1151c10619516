//! Pattern detection over classified commits in chronological order.
//!
//! - fix-after-feat / fix-after-refactor: a fix whose nearest preceding
//!   feat (resp. refactor) within `lookback` commits shares at least one
//!   file with it. Fixes landing on the same anchor form one signal.
//! - temporal cluster: same-kind commits within `cluster_window` seconds
//!   of the run's first commit, at least `cluster_min` of them. Runs never
//!   overlap.
//! - multi-edit chain: a file touched by three or more commits.
//!
//! Every signal carries a `severity` in `[0, 1]`: the share of the fixes'
//! files that the anchor also touched, or for a cluster the share of all
//! commits inside its window that belong to the run.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::classify::{ClassifiedCommit, CommitKind};
use crate::config::PatternsConfig;
use crate::range::format_day;
use crate::util::is_under;

pub const MULTI_EDIT_MIN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    FixAfterFeat,
    FixAfterRefactor,
    TemporalCluster,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Evidence {
    SharedFiles {
        files: Vec<String>,
    },
    Window {
        commit_type: CommitKind,
        start: i64,
        end: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    /// Short ids, oldest first.
    pub commits: Vec<String>,
    pub message: String,
    pub severity: f64,
    pub evidence: Evidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainCommit {
    pub commit: String,
    pub date: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiEditChain {
    pub path: String,
    pub edit_count: usize,
    pub commits: Vec<ChainCommit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorParams {
    pub lookback: usize,
    pub cluster_window: i64,
    pub cluster_min: usize,
}

impl From<&PatternsConfig> for DetectorParams {
    fn from(c: &PatternsConfig) -> Self {
        Self {
            lookback: c.lookback,
            cluster_window: c.cluster_window,
            cluster_min: c.cluster_min,
        }
    }
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self::from(&PatternsConfig::default())
    }
}

#[derive(Debug, Default)]
pub struct Detection {
    pub signals: Vec<Signal>,
    pub multi_edit_chains: Vec<MultiEditChain>,
    /// Commits left after the path filter.
    pub commits_analyzed: usize,
}

/// What the detector needs from one commit.
struct View<'a> {
    id: &'a str,
    time: i64,
    kind: CommitKind,
    summary: &'a str,
    files: BTreeSet<&'a str>,
}

/// Run every detector over `commits` (oldest first). With `prefix`, files
/// outside that directory are ignored and commits touching none of its
/// files are dropped.
pub fn detect(
    commits: &[ClassifiedCommit],
    params: &DetectorParams,
    prefix: Option<&str>,
) -> Detection {
    let views: Vec<View<'_>> = commits
        .iter()
        .filter_map(|c| {
            let files: BTreeSet<&str> = c
                .record
                .files
                .iter()
                .map(|f| f.path.as_str())
                .filter(|p| prefix.is_none_or(|pre| is_under(p, pre)))
                .collect();
            if prefix.is_some() && files.is_empty() {
                return None;
            }
            Some(View {
                id: &c.record.short_id,
                time: c.record.time,
                kind: c.kind(),
                summary: c.record.summary(),
                files,
            })
        })
        .collect();

    let mut signals = fix_after(&views, CommitKind::Feat, params.lookback);
    signals.extend(fix_after(&views, CommitKind::Refactor, params.lookback));
    signals.extend(temporal_clusters(
        &views,
        params.cluster_window,
        params.cluster_min,
    ));

    Detection {
        signals,
        multi_edit_chains: multi_edit_chains(&views),
        commits_analyzed: views.len(),
    }
}

struct AnchorGroup {
    anchor: usize,
    fixes: Vec<usize>,
    shared: BTreeSet<String>,
}

fn fix_after(views: &[View<'_>], anchor_kind: CommitKind, lookback: usize) -> Vec<Signal> {
    let mut groups: Vec<AnchorGroup> = Vec::new();
    let mut by_anchor: HashMap<usize, usize> = HashMap::new();

    for (i, fix) in views.iter().enumerate() {
        if fix.kind != CommitKind::Fix {
            continue;
        }
        let window = i.saturating_sub(lookback)..i;
        for j in window.rev() {
            let candidate = &views[j];
            if candidate.kind != anchor_kind {
                continue;
            }
            let shared: Vec<&str> = fix.files.intersection(&candidate.files).copied().collect();
            if shared.is_empty() {
                continue;
            }
            let slot = *by_anchor.entry(j).or_insert_with(|| {
                groups.push(AnchorGroup {
                    anchor: j,
                    fixes: Vec::new(),
                    shared: BTreeSet::new(),
                });
                groups.len() - 1
            });
            groups[slot].fixes.push(i);
            groups[slot]
                .shared
                .extend(shared.into_iter().map(str::to_string));
            break;
        }
    }

    groups.sort_by_key(|g| g.anchor);

    let kind = match anchor_kind {
        CommitKind::Refactor => SignalKind::FixAfterRefactor,
        _ => SignalKind::FixAfterFeat,
    };
    groups
        .into_iter()
        .map(|g| {
            let anchor = &views[g.anchor];
            let fix_files: BTreeSet<&str> = g
                .fixes
                .iter()
                .flat_map(|&i| views[i].files.iter().copied())
                .collect();
            let severity = fraction(g.shared.len(), fix_files.len());
            let mut commits = vec![anchor.id.to_string()];
            commits.extend(g.fixes.iter().map(|&i| views[i].id.to_string()));
            let message = format!(
                "{} {} followed {} {} ({:?}) on {} shared {}",
                g.fixes.len(),
                plural(g.fixes.len(), "fix", "fixes"),
                anchor_kind.label(),
                anchor.id,
                anchor.summary,
                g.shared.len(),
                plural(g.shared.len(), "file", "files"),
            );
            Signal {
                kind,
                commits,
                message,
                severity,
                evidence: Evidence::SharedFiles {
                    files: g.shared.into_iter().collect(),
                },
            }
        })
        .collect()
}

fn temporal_clusters(views: &[View<'_>], window: i64, min_size: usize) -> Vec<Signal> {
    let min_size = min_size.max(2);
    let mut by_kind: BTreeMap<CommitKind, Vec<&View<'_>>> = BTreeMap::new();
    for v in views {
        by_kind.entry(v.kind).or_default().push(v);
    }

    let mut clusters = Vec::new();
    for (kind, mut group) in by_kind {
        group.sort_by_key(|v| v.time);
        let mut i = 0;
        while i < group.len() {
            let start = group[i].time;
            let mut end = i;
            while end + 1 < group.len() && group[end + 1].time - start <= window {
                end += 1;
            }
            let run = &group[i..=end];
            if run.len() < min_size {
                i += 1;
                continue;
            }
            let last = run[run.len() - 1].time;
            let in_window = views
                .iter()
                .filter(|v| (start..=last).contains(&v.time))
                .count();
            clusters.push(Signal {
                kind: SignalKind::TemporalCluster,
                commits: run.iter().map(|v| v.id.to_string()).collect(),
                message: format!(
                    "{} {} commits within {} min",
                    run.len(),
                    kind.label(),
                    (last - start) / 60
                ),
                severity: fraction(run.len(), in_window),
                evidence: Evidence::Window {
                    commit_type: kind,
                    start,
                    end: last,
                },
            });
            i = end + 1;
        }
    }

    clusters.sort_by_key(|s| match s.evidence {
        Evidence::Window { start, .. } => start,
        Evidence::SharedFiles { .. } => 0,
    });
    clusters
}

fn multi_edit_chains(views: &[View<'_>]) -> Vec<MultiEditChain> {
    let mut history: BTreeMap<&str, Vec<&View<'_>>> = BTreeMap::new();
    for v in views {
        for &f in &v.files {
            history.entry(f).or_default().push(v);
        }
    }

    let mut chains: Vec<MultiEditChain> = history
        .into_iter()
        .filter(|(_, edits)| edits.len() >= MULTI_EDIT_MIN)
        .map(|(path, edits)| MultiEditChain {
            path: path.to_string(),
            edit_count: edits.len(),
            commits: edits
                .iter()
                .map(|v| ChainCommit {
                    commit: v.id.to_string(),
                    date: format_day(v.time),
                    message: v.summary.to_string(),
                })
                .collect(),
        })
        .collect();
    chains.sort_by(|a, b| b.edit_count.cmp(&a.edit_count).then_with(|| a.path.cmp(&b.path)));
    chains
}

/// `part / whole` clamped to `[0, 1]`, two decimals.
fn fraction(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let ratio = (part as f64 / whole as f64).clamp(0.0, 1.0);
    (ratio * 100.0).round() / 100.0
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

#[cfg(test)]
#[path = "detector_test.rs"]
mod tests;
