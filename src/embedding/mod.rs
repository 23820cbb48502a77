// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding backends and the multi-layer embedding engine.

pub mod backend;
pub mod engine;

pub use backend::{DummyBackend, EmbeddingBackend, FastEmbedBackend, HashBackend, LayerStack};
pub use engine::{EmbeddingEngine, EngineConfig};
