// SPDX-License-Identifier: MIT OR Apache-2.0

//! Similarity scoring and result ranking.

pub mod ranker;
pub mod scorer;

pub use ranker::{RankedResult, Ranker, RankerConfig};
pub use scorer::{cosine_similarity, BoostConfig, ScoredSection, SimilarityScorer, MIN_SCORE};
