// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-layer embedding engine.
//!
//! Sits between the pipeline and the backend: truncates oversized
//! spans, requests per-layer representations and averages the last K
//! layers elementwise into the single vector the rest of the pipeline
//! sees. Averaging multiple layers captures hierarchical linguistic
//! signal beyond the terminal layer alone.

use anyhow::Result;
use std::borrow::Cow;

use crate::embedding::backend::EmbeddingBackend;
use crate::errors::DocrankError;

/// Default number of trailing layers averaged per vector.
pub const DEFAULT_LAYERS: usize = 4;

/// Default head-truncation cutoff in characters.
pub const DEFAULT_MAX_CHARS: usize = 2000;

/// Engine knobs. Layer depth and quantization are strategy knobs of
/// the engine, not pipeline stages.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of trailing layers to average (K).
    pub layers: usize,
    /// Head-truncation cutoff: spans keep their first `max_chars`
    /// characters, cut on a char boundary.
    pub max_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layers: DEFAULT_LAYERS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// Converts text spans into fixed-length vectors via the injected
/// backend. Vectors are never mutated after creation.
pub struct EmbeddingEngine {
    backend: Box<dyn EmbeddingBackend>,
    config: EngineConfig,
}

impl EmbeddingEngine {
    pub fn new(backend: Box<dyn EmbeddingBackend>, config: EngineConfig) -> Self {
        Self { backend, config }
    }

    pub fn model_id(&self) -> &str {
        self.backend.model_id()
    }

    pub fn dimension(&self) -> usize {
        self.backend.dimension()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Embeds each text into one fixed-length vector.
    ///
    /// Oversized spans are head-truncated rather than failing the run.
    /// The backend contributes up to K trailing layers per text; fewer
    /// when it cannot surface that many.
    pub fn embed_texts(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prepared: Vec<String> = texts
            .iter()
            .map(|text| truncate_to_chars(text, self.config.max_chars).into_owned())
            .collect();

        let stacks = self.backend.embed_layers(&prepared)?;
        if stacks.len() != texts.len() {
            return Err(DocrankError::EmbeddingCountMismatch {
                expected: texts.len(),
                got: stacks.len(),
            }
            .into());
        }

        let layers = self.config.layers.max(1);
        Ok(stacks
            .into_iter()
            .map(|stack| average_trailing_layers(stack, layers, self.backend.dimension()))
            .collect())
    }

    pub fn embed_one(&mut self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_texts(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("No embedding returned"))
    }
}

/// Elementwise average of the last `layers` entries of the stack.
/// An empty stack degrades to a zero vector of the backend dimension.
fn average_trailing_layers(stack: Vec<Vec<f32>>, layers: usize, dimension: usize) -> Vec<f32> {
    if stack.is_empty() {
        return vec![0.0; dimension];
    }

    let take = layers.min(stack.len());
    let start = stack.len() - take;
    let dim = stack[start].len();
    let mut averaged = vec![0.0_f32; dim];

    for layer in &stack[start..] {
        for (slot, value) in averaged.iter_mut().zip(layer.iter()) {
            *slot += value;
        }
    }
    for slot in averaged.iter_mut() {
        *slot /= take as f32;
    }
    averaged
}

/// Keeps the first `max_chars` characters, cut on a char boundary.
fn truncate_to_chars(input: &str, max_chars: usize) -> Cow<'_, str> {
    if max_chars == 0 {
        return Cow::Borrowed("");
    }

    let mut count = 0;
    for (idx, _) in input.char_indices() {
        if count == max_chars {
            return Cow::Owned(input[..idx].to_string());
        }
        count += 1;
    }

    Cow::Borrowed(input)
}
