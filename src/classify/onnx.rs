//! Transformer commit classifier exported to ONNX, run with ONNX Runtime.
//!
//! The graph takes `input_ids` and `attention_mask` as `[1, MAX_LENGTH]`
//! int64 tensors and returns one row of logits per class.

use std::fmt::Display;
use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::TensorRef;
use tokenizers::Tokenizer;

use super::ml::{
    DEFAULT_THRESHOLD, LABEL_MAPPING, MessageModel, ModelError, ONNX_MODEL, TOKENIZER, best_label,
    label_table, read_artifact, softmax,
};

/// Sequence length the model was trained with.
pub const MAX_LENGTH: usize = 128;

pub struct OnnxModel {
    // running a session needs exclusive access
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: Vec<String>,
}

fn backend<E: Display>(artifact: &'static str) -> impl FnOnce(E) -> ModelError {
    move |e| ModelError::Backend {
        artifact,
        message: e.to_string(),
    }
}

impl OnnxModel {
    pub fn load(model_dir: &Path) -> Result<Self, ModelError> {
        let labels = label_table(&read_artifact(&model_dir.join(LABEL_MAPPING))?)?;
        let tokenizer =
            Tokenizer::from_file(model_dir.join(TOKENIZER)).map_err(backend(TOKENIZER))?;
        let session = Session::builder()
            .map_err(backend(ONNX_MODEL))?
            .commit_from_file(model_dir.join(ONNX_MODEL))
            .map_err(backend(ONNX_MODEL))?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels,
        })
    }

    fn logits(&self, message: &str) -> Option<Vec<f32>> {
        let encoding = self.tokenizer.encode(message, true).ok()?;
        let input_ids = pad_or_truncate(encoding.get_ids(), MAX_LENGTH);
        let attention_mask = pad_or_truncate(encoding.get_attention_mask(), MAX_LENGTH);

        let input_ids = TensorRef::from_array_view(([1usize, MAX_LENGTH], &*input_ids)).ok()?;
        let attention_mask =
            TensorRef::from_array_view(([1usize, MAX_LENGTH], &*attention_mask)).ok()?;

        let mut session = self.session.lock().ok()?;
        let outputs = session
            .run(ort::inputs![input_ids, attention_mask])
            .map_err(|e| tracing::debug!("model inference failed: {e}"))
            .ok()?;
        let (_shape, logits) = outputs[0].try_extract_tensor::<f32>().ok()?;
        Some(logits.to_vec())
    }
}

impl MessageModel for OnnxModel {
    fn classify(&self, message: &str) -> Option<(String, f32)> {
        let logits = self.logits(message)?;
        best_label(&softmax(&logits), &self.labels, DEFAULT_THRESHOLD)
    }
}

/// Token ids widened to int64, zero-padded or cut to `len`.
pub fn pad_or_truncate(ids: &[u32], len: usize) -> Vec<i64> {
    let mut out: Vec<i64> = ids.iter().take(len).map(|&id| i64::from(id)).collect();
    out.resize(len, 0);
    out
}

#[cfg(test)]
#[path = "onnx_test.rs"]
mod tests;
