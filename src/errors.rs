// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the ranking pipeline.

use thiserror::Error;

/// Failure modes surfaced by the ranking pipeline.
///
/// Per-document problems are not errors: a document that fails to load or
/// yields no sections is recorded in the run output and skipped. These
/// variants cover the conditions that make a whole run impossible.
#[derive(Debug, Error)]
pub enum DocrankError {
    /// The query descriptor is missing a required field.
    #[error("query descriptor is missing required field `{0}`")]
    MalformedQuery(&'static str),

    /// The embedding backend could not be initialized at run start.
    #[error("embedding backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The embedding backend returned a malformed response.
    #[error("embedding backend returned {got} vectors for {expected} inputs")]
    EmbeddingCountMismatch { expected: usize, got: usize },
}
