// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cosine similarity scoring with optional persona-aware boosting.

use rayon::prelude::*;

use crate::extract::{Section, SectionKind};

/// Score assigned to degenerate (zero-magnitude) vectors: the minimum
/// cosine similarity, so empty sections sink to the bottom instead of
/// causing a division error.
pub const MIN_SCORE: f32 = -1.0;

/// Cosine similarity of two vectors.
///
/// Invariant under positive scalar rescaling of either input. A zero
/// magnitude or length mismatch yields [`MIN_SCORE`].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return MIN_SCORE;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return MIN_SCORE;
    }

    dot / (magnitude_a * magnitude_b)
}

/// A section with its relevance score. The rank is assigned later by
/// the ranker.
#[derive(Debug, Clone)]
pub struct ScoredSection {
    pub section: Section,
    pub score: f32,
    /// 1-based rank, 0 until the ranker assigns it.
    pub rank: usize,
}

/// Query terms that signal affinity for labeled component sections.
const COMPONENT_AFFINITY_TERMS: &[&str] = &["food", "recipe", "vegetarian", "menu"];

/// Query terms that signal affinity for heading/procedural sections.
const PROCEDURE_AFFINITY_TERMS: &[&str] = &["plan", "organize", "prepare", "create"];

/// Graduated boost factors for expansion-term hits.
#[derive(Debug, Clone)]
pub struct BoostConfig {
    pub enabled: bool,
    /// Base boost when the title contains any expansion term.
    pub title_base: f32,
    /// Additional boost per title hit.
    pub title_per_hit: f32,
    /// Base boost when the body contains any expansion term.
    pub body_base: f32,
    /// Additional boost per body hit.
    pub body_per_hit: f32,
    /// Boost for labeled components when the query leans that way.
    pub component_kind: f32,
    /// Boost for heading/procedural sections when the query leans
    /// toward planning or instructions.
    pub procedure_kind: f32,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title_base: 0.25,
            title_per_hit: 0.1,
            body_base: 0.1,
            body_per_hit: 0.05,
            component_kind: 0.2,
            procedure_kind: 0.15,
        }
    }
}

/// Scores sections against the enriched query vector.
pub struct SimilarityScorer {
    boost: BoostConfig,
}

impl SimilarityScorer {
    pub fn new(boost: BoostConfig) -> Self {
        Self { boost }
    }

    pub fn with_defaults() -> Self {
        Self::new(BoostConfig::default())
    }

    /// Scores each section vector against the query vector, applying
    /// persona-aware boosting when enabled. Sections and vectors are
    /// zipped positionally; the caller guarantees the association.
    pub fn score(
        &self,
        query_vector: &[f32],
        sections: Vec<Section>,
        section_vectors: &[Vec<f32>],
        boost_terms: &[String],
    ) -> Vec<ScoredSection> {
        debug_assert_eq!(sections.len(), section_vectors.len());

        sections
            .into_par_iter()
            .zip(section_vectors.par_iter())
            .map(|(section, vector)| {
                let base = cosine_similarity(query_vector, vector);
                let score = if self.boost.enabled && base > MIN_SCORE {
                    base * self.boost_factor(&section, boost_terms)
                } else {
                    base
                };
                ScoredSection {
                    section,
                    score,
                    rank: 0,
                }
            })
            .collect()
    }

    /// Multiplicative boost from expansion-term hits in title and body.
    fn boost_factor(&self, section: &Section, terms: &[String]) -> f32 {
        if terms.is_empty() {
            return 1.0;
        }

        let title = section.title.to_lowercase();
        let body = section.body.to_lowercase();

        let title_hits = terms.iter().filter(|t| title.contains(t.as_str())).count();
        let body_hits = terms.iter().filter(|t| body.contains(t.as_str())).count();

        let mut factor = 1.0;
        if title_hits > 0 {
            factor += self.boost.title_base + title_hits as f32 * self.boost.title_per_hit;
        }
        if body_hits > 0 {
            factor += self.boost.body_base + body_hits as f32 * self.boost.body_per_hit;
        }
        factor + self.kind_affinity(section.kind, terms)
    }

    /// Extra boost for section kinds the query has affinity with.
    fn kind_affinity(&self, kind: SectionKind, terms: &[String]) -> f32 {
        let has_any = |table: &[&str]| terms.iter().any(|t| table.contains(&t.as_str()));
        match kind {
            SectionKind::LabeledComponent if has_any(COMPONENT_AFFINITY_TERMS) => {
                self.boost.component_kind
            }
            SectionKind::Heading | SectionKind::Procedural
                if has_any(PROCEDURE_AFFINITY_TERMS) =>
            {
                self.boost.procedure_kind
            }
            _ => 0.0,
        }
    }
}
