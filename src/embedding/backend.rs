// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding backend interface and implementations.
//!
//! A backend is the external model capability: text in, per-layer
//! vectors out. The production backend wraps fastembed; the hash and
//! dummy backends exist for deterministic tests and fallback.

use anyhow::{Context, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::errors::DocrankError;

const DEFAULT_BATCH_SIZE: usize = 256;

/// Vectors for one text, ordered from earliest exposed layer to the
/// final layer. Backends that cannot surface intermediate layers return
/// a single-entry stack.
pub type LayerStack = Vec<Vec<f32>>;

/// External embedding capability consumed by the engine.
///
/// Implementations share no mutable model state across calls beyond
/// what `&mut self` serializes; the loaded model itself is read-only.
pub trait EmbeddingBackend: Send {
    /// Model identifier for output metadata.
    fn model_id(&self) -> &str;

    /// Length of every vector this backend produces.
    fn dimension(&self) -> usize;

    /// Number of internal layers the backend can surface per text.
    fn layer_count(&self) -> usize;

    /// Embeds each text into a [`LayerStack`]. Must return exactly one
    /// stack per input, in input order.
    fn embed_layers(&mut self, texts: &[String]) -> Result<Vec<LayerStack>>;
}

/// fastembed-backed production backend.
///
/// fastembed surfaces only the pooled terminal representation, so each
/// stack has a single layer; the engine's layer averaging degenerates
/// to that layer. The quantized flag selects the reduced-precision
/// model variant with the same vector shape.
pub struct FastEmbedBackend {
    embedder: TextEmbedding,
    model_id: String,
    dimension: usize,
    batch_size: usize,
}

impl FastEmbedBackend {
    pub fn new(quantized: bool) -> Result<Self, DocrankError> {
        let model = if quantized {
            EmbeddingModel::AllMiniLML6V2Q
        } else {
            EmbeddingModel::AllMiniLML6V2
        };
        let model_id = model.to_string();
        let embedder = TextEmbedding::try_new(InitOptions::new(model))
            .map_err(|err| DocrankError::BackendUnavailable(err.to_string()))?;

        Ok(Self {
            embedder,
            model_id,
            dimension: 384,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }
}

impl EmbeddingBackend for FastEmbedBackend {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn layer_count(&self) -> usize {
        1
    }

    fn embed_layers(&mut self, texts: &[String]) -> Result<Vec<LayerStack>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self
            .embedder
            .embed(texts, Some(self.batch_size))
            .context("fastembed embedding failed")?;
        Ok(embeddings.into_iter().map(|v| vec![v]).collect())
    }
}

/// Deterministic bag-of-words hash backend for tests.
///
/// Each token is hashed into a bucket per synthetic layer; texts that
/// share vocabulary land in shared buckets and score high cosine
/// similarity, which is enough to exercise the whole pipeline without
/// a model download.
pub struct HashBackend {
    dimension: usize,
    layers: usize,
}

impl HashBackend {
    pub fn new(dimension: usize, layers: usize) -> Self {
        Self { dimension, layers }
    }

    pub fn with_defaults() -> Self {
        Self::new(32, 4)
    }

    fn layer_vector(&self, text: &str, layer: usize) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];
        for token in text.split_whitespace() {
            let token: String = token
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if token.is_empty() {
                continue;
            }
            let mut hasher = blake3::Hasher::new();
            hasher.update(&[layer as u8]);
            hasher.update(token.as_bytes());
            let digest = hasher.finalize();
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(&digest.as_bytes()[..4]);
            let bucket = u32::from_le_bytes(bytes) as usize % self.dimension;
            vector[bucket] += 1.0;
        }
        vector
    }
}

impl EmbeddingBackend for HashBackend {
    fn model_id(&self) -> &str {
        "hash-projection"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn layer_count(&self) -> usize {
        self.layers
    }

    fn embed_layers(&mut self, texts: &[String]) -> Result<Vec<LayerStack>> {
        Ok(texts
            .iter()
            .map(|text| {
                (0..self.layers)
                    .map(|layer| self.layer_vector(text, layer))
                    .collect()
            })
            .collect())
    }
}

/// Zero-vector backend (testing/fallback).
pub struct DummyBackend {
    dimension: usize,
}

impl DummyBackend {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl EmbeddingBackend for DummyBackend {
    fn model_id(&self) -> &str {
        "dummy"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn layer_count(&self) -> usize {
        1
    }

    fn embed_layers(&mut self, texts: &[String]) -> Result<Vec<LayerStack>> {
        Ok(texts
            .iter()
            .map(|_| vec![vec![0.0; self.dimension]])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_backend_returns_zero_vectors() {
        let mut backend = DummyBackend::new(8);
        let stacks = backend
            .embed_layers(&["hello".to_string(), "world".to_string()])
            .unwrap();
        assert_eq!(stacks.len(), 2);
        assert_eq!(stacks[0].len(), 1);
        assert_eq!(stacks[0][0].len(), 8);
        assert!(stacks[0][0].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn hash_backend_is_deterministic() {
        let mut backend = HashBackend::with_defaults();
        let a = backend.embed_layers(&["plan a trip".to_string()]).unwrap();
        let b = backend.embed_layers(&["plan a trip".to_string()]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hash_backend_exposes_multiple_distinct_layers() {
        let mut backend = HashBackend::with_defaults();
        let stacks = backend
            .embed_layers(&["itinerary booking hotel".to_string()])
            .unwrap();
        assert_eq!(stacks[0].len(), 4);
        // Different layer seeds should place tokens in different buckets.
        assert_ne!(stacks[0][0], stacks[0][1]);
    }

    #[test]
    fn hash_backend_empty_text_is_zero_vector() {
        let mut backend = HashBackend::with_defaults();
        let stacks = backend.embed_layers(&["   ".to_string()]).unwrap();
        assert!(stacks[0][0].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let mut backend = HashBackend::with_defaults();
        assert!(backend.embed_layers(&[]).unwrap().is_empty());
    }
}
