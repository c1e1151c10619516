//! Commit classification.
//!
//! A priority rule chain on the message subject and parent count, first
//! match wins: merge, revert, release, conventional prefix, natural-language
//! heuristics, other. An optional text model is consulted only when the
//! chain falls through to `other`.

pub mod ml;
#[cfg(feature = "ml")]
pub mod onnx;
pub mod ticket;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::git::CommitRecord;
use crate::git::authors::AuthorIdentity;
use ml::MessageModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitKind {
    Merge,
    Revert,
    Release,
    Feat,
    Fix,
    Chore,
    Docs,
    Refactor,
    Test,
    Style,
    Perf,
    Ci,
    Build,
    Other,
}

impl CommitKind {
    pub const ALL: [CommitKind; 14] = [
        CommitKind::Merge,
        CommitKind::Revert,
        CommitKind::Release,
        CommitKind::Feat,
        CommitKind::Fix,
        CommitKind::Chore,
        CommitKind::Docs,
        CommitKind::Refactor,
        CommitKind::Test,
        CommitKind::Style,
        CommitKind::Perf,
        CommitKind::Ci,
        CommitKind::Build,
        CommitKind::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CommitKind::Merge => "merge",
            CommitKind::Revert => "revert",
            CommitKind::Release => "release",
            CommitKind::Feat => "feat",
            CommitKind::Fix => "fix",
            CommitKind::Chore => "chore",
            CommitKind::Docs => "docs",
            CommitKind::Refactor => "refactor",
            CommitKind::Test => "test",
            CommitKind::Style => "style",
            CommitKind::Perf => "perf",
            CommitKind::Ci => "ci",
            CommitKind::Build => "build",
            CommitKind::Other => "other",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(label))
    }
}

/// Which rule produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSource {
    Merge,
    Revert,
    Release,
    Conventional,
    Heuristic,
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub kind: CommitKind,
    pub source: RuleSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
    /// Model confidence, set only for `RuleSource::Model`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// A walked commit with its canonical author and classification.
#[derive(Debug, Clone)]
pub struct ClassifiedCommit {
    pub record: CommitRecord,
    pub author: AuthorIdentity,
    pub class: Classification,
}

impl ClassifiedCommit {
    pub fn kind(&self) -> CommitKind {
        self.class.kind
    }
}

static CONVENTIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?i-u:(feat|fix|chore|docs|refactor|test|style|perf|ci|build))(\([^()\r\n]*\))?!?:",
    )
    .expect("valid regex")
});

static CLOSES_ISSUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:fixes|fixed|closes) #[0-9]+").expect("valid regex")
});

/// Rule chain only. Never consults a model.
pub fn classify_rules(message: &str, parent_count: usize) -> (CommitKind, RuleSource) {
    if parent_count >= 2 {
        return (CommitKind::Merge, RuleSource::Merge);
    }

    let subject = message.lines().next().unwrap_or("").trim_start();
    let lower = subject.to_lowercase();

    if ["revert \"", "revert:", "revert("]
        .iter()
        .any(|p| lower.starts_with(p))
    {
        return (CommitKind::Revert, RuleSource::Revert);
    }

    if is_release(&lower) {
        return (CommitKind::Release, RuleSource::Release);
    }

    if let Some(kind) = CONVENTIONAL
        .captures(subject)
        .and_then(|c| CommitKind::from_label(&c[1]))
    {
        return (kind, RuleSource::Conventional);
    }

    if let Some(kind) = heuristic(&lower) {
        return (kind, RuleSource::Heuristic);
    }

    (CommitKind::Other, RuleSource::Fallback)
}

fn is_release(lower: &str) -> bool {
    let mut chars = lower.chars();
    let version_tag = chars.next() == Some('v') && chars.next().is_some_and(|c| c.is_ascii_digit());
    version_tag || lower.contains("release") || lower.contains("bump version")
}

fn heuristic(lower: &str) -> Option<CommitKind> {
    const FIX_PREFIXES: [&str; 5] = ["fixed ", "fixed:", "bugfix", "bug fix", "hotfix"];
    const FEAT_PREFIXES: [&str; 2] = ["added ", "added:"];

    if FIX_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return Some(CommitKind::Fix);
    }
    if FEAT_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return Some(CommitKind::Feat);
    }
    if CLOSES_ISSUE.is_match(lower) {
        return Some(CommitKind::Fix);
    }
    None
}

/// Rule chain plus an optional model fallback.
pub struct Classifier {
    model: Option<Box<dyn MessageModel>>,
}

impl Classifier {
    pub fn rules_only() -> Self {
        Self { model: None }
    }

    pub fn with_model(model: Box<dyn MessageModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Load the model artifacts in `model_dir`. A model that cannot be loaded
    /// leaves the classifier rule-only.
    pub fn from_model_dir(model_dir: &Path) -> Self {
        match ml::load_model(model_dir) {
            Ok(model) => {
                tracing::info!(
                    dir = %model_dir.display(),
                    threshold = model.threshold(),
                    "loaded commit message model"
                );
                Self::with_model(model)
            }
            Err(e) => {
                tracing::warn!("ML classifier unavailable, using rules only: {e}");
                Self::rules_only()
            }
        }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// "rules" or "rules+ml".
    pub fn mode(&self) -> &'static str {
        if self.has_model() { "rules+ml" } else { "rules" }
    }

    pub fn classify(&self, message: &str, parent_count: usize) -> Classification {
        let ticket = ticket::extract_ticket(message);
        let (kind, source) = classify_rules(message, parent_count);

        if kind == CommitKind::Other {
            if let Some((kind, confidence)) = self.model_override(message) {
                return Classification {
                    kind,
                    source: RuleSource::Model,
                    ticket,
                    confidence: Some(confidence),
                };
            }
        }

        Classification {
            kind,
            source,
            ticket,
            confidence: None,
        }
    }

    fn model_override(&self, message: &str) -> Option<(CommitKind, f32)> {
        let (label, confidence) = self.model.as_ref()?.classify(message)?;
        match CommitKind::from_label(&label) {
            Some(CommitKind::Merge | CommitKind::Other) | None => {
                tracing::debug!(label = %label, "ignoring model label");
                None
            }
            Some(kind) => Some((kind, confidence)),
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
