//! Pre-trained commit-message classifiers.
//!
//! A model directory always holds `label_mapping.json` (class index to
//! label, e.g. `{"0": "fix"}`). The backend is picked by the other files:
//!
//! - `model.onnx` + `tokenizer.json` (HuggingFace tokenizer): a fine-tuned
//!   transformer run through ONNX Runtime. Needs the `ml` cargo feature.
//! - `model.json` + `vectorizer.json`: a TF-IDF vectorizer (vocabulary,
//!   idf weights, n-gram range, lowercasing, sublinear tf, optional token
//!   regex) followed by a multinomial linear classifier (one coefficient row
//!   and one intercept per class, optional confidence threshold). Pure Rust.
//!
//! Loading never affects the caller's control flow: any problem surfaces as
//! a [`ModelError`] that the classifier turns into a warning.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_THRESHOLD: f32 = 0.5;

pub const ONNX_MODEL: &str = "model.onnx";
pub const TOKENIZER: &str = "tokenizer.json";
pub const LINEAR_MODEL: &str = "model.json";
pub const VECTORIZER: &str = "vectorizer.json";
pub const LABEL_MAPPING: &str = "label_mapping.json";

const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// A text model that maps a commit message to a label with a confidence.
pub trait MessageModel {
    /// `None` when the best label's confidence is below the model threshold.
    fn classify(&self, message: &str) -> Option<(String, f32)>;

    fn threshold(&self) -> f32 {
        DEFAULT_THRESHOLD
    }
}

/// Load whichever backend the artifacts in `model_dir` describe. An ONNX
/// model wins over a linear one when both are present.
pub fn load_model(model_dir: &Path) -> Result<Box<dyn MessageModel>, ModelError> {
    if model_dir.join(ONNX_MODEL).is_file() {
        return load_onnx(model_dir);
    }
    if model_dir.join(LINEAR_MODEL).is_file() {
        return Ok(Box::new(LinearTextModel::load(model_dir)?));
    }
    Err(ModelError::Read {
        path: model_dir.join(ONNX_MODEL),
        source: std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("neither {ONNX_MODEL} nor {LINEAR_MODEL} found"),
        ),
    })
}

#[cfg(feature = "ml")]
fn load_onnx(model_dir: &Path) -> Result<Box<dyn MessageModel>, ModelError> {
    Ok(Box::new(super::onnx::OnnxModel::load(model_dir)?))
}

#[cfg(not(feature = "ml"))]
fn load_onnx(_model_dir: &Path) -> Result<Box<dyn MessageModel>, ModelError> {
    Err(ModelError::Backend {
        artifact: ONNX_MODEL,
        message: "built without the `ml` feature (rebuild with --features ml)".to_string(),
    })
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {artifact}: {source}")]
    Parse {
        artifact: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot load {artifact}: {message}")]
    Backend {
        artifact: &'static str,
        message: String,
    },

    #[error("invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("inconsistent model artifacts: {0}")]
    Inconsistent(String),
}

#[derive(Deserialize)]
struct VectorizerSpec {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default = "default_lowercase")]
    lowercase: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    token_pattern: Option<String>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_lowercase() -> bool {
    true
}

#[derive(Deserialize)]
struct LinearSpec {
    coef: Vec<Vec<f32>>,
    intercept: Vec<f32>,
    #[serde(default)]
    threshold: Option<f32>,
}

pub struct LinearTextModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    ngram_range: (usize, usize),
    lowercase: bool,
    sublinear_tf: bool,
    token_re: Regex,
    coef: Vec<Vec<f32>>,
    intercept: Vec<f32>,
    labels: Vec<String>,
    threshold: f32,
}

impl LinearTextModel {
    pub fn load(model_dir: &Path) -> Result<Self, ModelError> {
        let vectorizer = read_artifact(&model_dir.join(VECTORIZER))?;
        let model = read_artifact(&model_dir.join(LINEAR_MODEL))?;
        let labels = read_artifact(&model_dir.join(LABEL_MAPPING))?;
        Self::from_json(&vectorizer, &model, &labels)
    }

    pub fn from_json(vectorizer: &str, model: &str, labels: &str) -> Result<Self, ModelError> {
        let tok: VectorizerSpec = serde_json::from_str(vectorizer).map_err(|source| {
            ModelError::Parse {
                artifact: VECTORIZER,
                source,
            }
        })?;
        let lin: LinearSpec = serde_json::from_str(model).map_err(|source| ModelError::Parse {
            artifact: LINEAR_MODEL,
            source,
        })?;
        let labels = label_table(labels)?;

        let features = tok.idf.len();
        if let Some((term, &idx)) = tok.vocabulary.iter().find(|&(_, &idx)| idx >= features) {
            return Err(ModelError::Inconsistent(format!(
                "term {term:?} maps to feature {idx} but idf has {features} entries"
            )));
        }
        let (lo, hi) = tok.ngram_range;
        if lo == 0 || lo > hi {
            return Err(ModelError::Inconsistent(format!(
                "bad ngram_range [{lo}, {hi}]"
            )));
        }

        let classes = lin.intercept.len();
        if classes < 2 || lin.coef.len() != classes {
            return Err(ModelError::Inconsistent(format!(
                "{} coefficient rows for {classes} intercepts",
                lin.coef.len()
            )));
        }
        if let Some(row) = lin.coef.iter().find(|row| row.len() != features) {
            return Err(ModelError::Inconsistent(format!(
                "coefficient row of {} weights for {features} features",
                row.len()
            )));
        }

        if labels.len() < classes {
            return Err(ModelError::Inconsistent(format!(
                "no label for class {}",
                labels.len()
            )));
        }
        if labels.len() > classes {
            return Err(ModelError::Inconsistent(format!(
                "label index {} out of {classes} classes",
                labels.len() - 1
            )));
        }

        let threshold = lin.threshold.unwrap_or(DEFAULT_THRESHOLD);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ModelError::Inconsistent(format!(
                "threshold {threshold} outside [0, 1]"
            )));
        }

        let pattern = tok.token_pattern.as_deref().unwrap_or(DEFAULT_TOKEN_PATTERN);
        Ok(Self {
            vocabulary: tok.vocabulary,
            idf: tok.idf,
            ngram_range: (lo, hi),
            lowercase: tok.lowercase,
            sublinear_tf: tok.sublinear_tf,
            token_re: Regex::new(pattern)?,
            coef: lin.coef,
            intercept: lin.intercept,
            labels,
            threshold,
        })
    }

    /// L2-normalized sparse TF-IDF vector.
    fn features(&self, message: &str) -> HashMap<usize, f32> {
        let text = if self.lowercase {
            message.to_lowercase()
        } else {
            message.to_string()
        };
        let tokens: Vec<&str> = self.token_re.find_iter(&text).map(|m| m.as_str()).collect();

        let mut counts: HashMap<usize, f32> = HashMap::new();
        let (lo, hi) = self.ngram_range;
        for n in lo..=hi {
            for gram in tokens.windows(n) {
                if let Some(&idx) = self.vocabulary.get(&gram.join(" ")) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }
        }

        for (idx, value) in counts.iter_mut() {
            let tf = if self.sublinear_tf {
                1.0 + value.ln()
            } else {
                *value
            };
            *value = tf * self.idf[*idx];
        }

        let norm = counts.values().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            counts.values_mut().for_each(|v| *v /= norm);
        }
        counts
    }

    fn probabilities(&self, message: &str) -> Vec<f32> {
        let x = self.features(message);
        let scores: Vec<f32> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| b + x.iter().map(|(&i, v)| row[i] * v).sum::<f32>())
            .collect();
        softmax(&scores)
    }
}

impl MessageModel for LinearTextModel {
    fn classify(&self, message: &str) -> Option<(String, f32)> {
        best_label(&self.probabilities(message), &self.labels, self.threshold)
    }

    fn threshold(&self) -> f32 {
        self.threshold
    }
}

/// Argmax of `probs` mapped through `labels`, `None` under `threshold` or
/// when the class has no label.
pub(crate) fn best_label(probs: &[f32], labels: &[String], threshold: f32) -> Option<(String, f32)> {
    let (best, &p) = probs
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))?;
    if p < threshold {
        return None;
    }
    Some((labels.get(best)?.clone(), p))
}

/// Parse `label_mapping.json` into a table indexed by class. Keys must be
/// the class indices `0..n` with no gaps.
pub(crate) fn label_table(raw: &str) -> Result<Vec<String>, ModelError> {
    let raw: HashMap<String, String> =
        serde_json::from_str(raw).map_err(|source| ModelError::Parse {
            artifact: LABEL_MAPPING,
            source,
        })?;
    let mut by_index: Vec<(usize, String)> = raw
        .into_iter()
        .map(|(key, label)| {
            key.parse::<usize>().map(|idx| (idx, label)).map_err(|_| {
                ModelError::Inconsistent(format!("label key {key:?} is not a class index"))
            })
        })
        .collect::<Result<_, _>>()?;
    by_index.sort_by_key(|(idx, _)| *idx);

    let mut labels = Vec::with_capacity(by_index.len());
    for (expected, (idx, label)) in by_index.into_iter().enumerate() {
        if idx != expected {
            return Err(ModelError::Inconsistent(format!("no label for class {expected}")));
        }
        labels.push(label);
    }
    Ok(labels)
}

pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

pub(crate) fn read_artifact(path: &Path) -> Result<String, ModelError> {
    std::fs::read_to_string(path).map_err(|source| ModelError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "ml_test.rs"]
mod tests;
