use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::classify::{ClassifiedCommit, CommitKind, RuleSource};
use crate::range::format_day;
use crate::util::{percentage, round1};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindCount {
    #[serde(rename = "type")]
    pub kind: CommitKind,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: String,
    pub commits: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub avg_lines_per_commit: f64,
    pub max_lines_in_commit: usize,
    pub min_lines_in_commit: usize,
    pub total_lines_changed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketCount {
    pub ticket: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSummary {
    pub mode: String,
    pub ml_overrides: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_commits: usize,
    pub commit_types: Vec<KindCount>,
    pub activity: Vec<DailyActivity>,
    pub velocity: Velocity,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ticket_refs: Vec<TicketCount>,
    pub classifier: ClassifierSummary,
}

impl Metrics {
    pub fn count(&self, kind: CommitKind) -> usize {
        self.commit_types
            .iter()
            .find(|k| k.kind == kind)
            .map_or(0, |k| k.count)
    }
}

/// Kind distribution, daily activity, velocity and ticket references.
/// `activity` is newest day first; `ticket_refs` by count then name.
pub fn summarize(commits: &[ClassifiedCommit], mode: &str) -> Metrics {
    let total = commits.len();
    let mut kinds: BTreeMap<CommitKind, usize> = BTreeMap::new();
    let mut daily: BTreeMap<String, usize> = BTreeMap::new();
    let mut tickets: HashMap<&str, usize> = HashMap::new();
    let mut ml_overrides = 0;

    for c in commits {
        *kinds.entry(c.kind()).or_insert(0) += 1;
        *daily.entry(format_day(c.record.time)).or_insert(0) += 1;
        if let Some(t) = c.class.ticket.as_deref() {
            *tickets.entry(t).or_insert(0) += 1;
        }
        if c.class.source == RuleSource::Model {
            ml_overrides += 1;
        }
    }

    let mut commit_types: Vec<KindCount> = kinds
        .into_iter()
        .map(|(kind, count)| KindCount {
            kind,
            count,
            percentage: percentage(count, total),
        })
        .collect();
    commit_types.sort_by(|a, b| b.count.cmp(&a.count).then(a.kind.cmp(&b.kind)));

    let activity = daily
        .into_iter()
        .rev()
        .map(|(date, commits)| DailyActivity { date, commits })
        .collect();

    let mut ticket_refs: Vec<TicketCount> = tickets
        .into_iter()
        .map(|(ticket, count)| TicketCount {
            ticket: ticket.to_string(),
            count,
        })
        .collect();
    ticket_refs.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.ticket.cmp(&b.ticket)));

    Metrics {
        total_commits: total,
        commit_types,
        activity,
        velocity: velocity(commits),
        ticket_refs,
        classifier: ClassifierSummary {
            mode: mode.to_string(),
            ml_overrides,
        },
    }
}

fn velocity(commits: &[ClassifiedCommit]) -> Velocity {
    let lines: Vec<usize> = commits.iter().map(|c| c.record.lines_changed()).collect();
    let total: usize = lines.iter().sum();
    Velocity {
        avg_lines_per_commit: if lines.is_empty() {
            0.0
        } else {
            round1(total as f64 / lines.len() as f64)
        },
        max_lines_in_commit: lines.iter().copied().max().unwrap_or(0),
        min_lines_in_commit: lines.iter().copied().min().unwrap_or(0),
        total_lines_changed: total,
    }
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
