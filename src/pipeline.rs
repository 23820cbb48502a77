// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ranking pipeline: one query descriptor plus one document set in,
//! one ranked result out.
//!
//! Each run owns its sections, vectors and results; nothing is shared
//! or mutated across concurrent runs. The embedding engine is the
//! dominant cost center, so all section texts go through it in a
//! single batched call with the query text in front.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::document::{Document, DocumentFailure};
use crate::embedding::EmbeddingEngine;
use crate::extract::{FilterConfig, Section, SectionExtractor, SectionFilter};
use crate::query::{EnrichedQuery, QueryDescriptor, QueryExpander};
use crate::rank::{BoostConfig, RankedResult, Ranker, RankerConfig, ScoredSection, SimilarityScorer};

/// Consolidated result cap applied when no explicit top-N is set.
pub const DEFAULT_RESULT_CAP: usize = 15;

/// Default per-document result cap.
pub const DEFAULT_PER_DOCUMENT_TOP: usize = 5;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub filter: FilterConfig,
    pub ranker: RankerConfig,
    pub boost: BoostConfig,
    /// Entries kept in each per-document ranking.
    pub per_document_top: usize,
    /// Draw an extraction progress bar (CLI runs).
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            ranker: RankerConfig::default(),
            boost: BoostConfig::default(),
            per_document_top: DEFAULT_PER_DOCUMENT_TOP,
            show_progress: false,
        }
    }
}

/// Ranking of the surviving sections of a single document.
#[derive(Debug, Clone)]
pub struct DocumentRanking {
    pub document: String,
    pub result: RankedResult,
}

/// Terminal artifact of one run.
#[derive(Debug)]
pub struct RunOutput {
    /// Globally ranked sections across the whole collection.
    pub consolidated: RankedResult,
    /// Per-document top sections, in document input order.
    pub per_document: Vec<DocumentRanking>,
    /// Documents that could not be processed.
    pub failures: Vec<DocumentFailure>,
    /// The enriched query the run was scored against.
    pub query: EnrichedQuery,
    /// Section candidates before filtering.
    pub sections_extracted: usize,
    /// Sections that survived filtering and were scored.
    pub sections_scored: usize,
    /// Backend model identifier.
    pub model_id: String,
}

/// Batch, single-run-at-a-time ranking pipeline.
pub struct Pipeline {
    engine: EmbeddingEngine,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(engine: EmbeddingEngine, config: PipelineConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the full pipeline.
    ///
    /// Fatal errors: malformed query descriptor, or the embedding
    /// backend failing outright. A document with no extractable text
    /// contributes zero sections and never fails the run.
    pub fn run(&mut self, descriptor: QueryDescriptor, documents: &[Document]) -> Result<RunOutput> {
        let query = QueryExpander::with_defaults().expand(descriptor)?;
        self.run_expanded(query, documents)
    }

    /// Same as [`Pipeline::run`] with a pre-built enriched query, so
    /// callers can supply custom expansion tables.
    pub fn run_expanded(&mut self, query: EnrichedQuery, documents: &[Document]) -> Result<RunOutput> {
        let candidates = self.extract_all(documents);
        let sections_extracted = candidates.len();

        let filter = SectionFilter::new(self.config.filter.clone());
        let sections = filter.filter(candidates);
        let sections_scored = sections.len();

        tracing::info!(
            documents = documents.len(),
            extracted = sections_extracted,
            scored = sections_scored,
            "scoring sections"
        );

        let scored = self.score_sections(&query, sections)?;

        let consolidated_config = RankerConfig {
            epsilon: self.config.ranker.epsilon,
            top_n: self.config.ranker.top_n.or(Some(DEFAULT_RESULT_CAP)),
        };
        let consolidated = Ranker::new(consolidated_config).rank(scored.clone());

        let per_document = self.rank_per_document(documents, scored);

        Ok(RunOutput {
            consolidated,
            per_document,
            failures: Vec::new(),
            query,
            sections_extracted,
            sections_scored,
            model_id: self.engine.model_id().to_string(),
        })
    }

    /// Extracts candidates from every document in input order.
    fn extract_all(&self, documents: &[Document]) -> Vec<Section> {
        let extractor = SectionExtractor::new();
        let bar = if self.config.show_progress {
            let bar = ProgressBar::new(documents.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_message("extracting");
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut candidates = Vec::new();
        for document in documents {
            candidates.extend(extractor.extract(document));
            bar.inc(1);
        }
        bar.finish_and_clear();
        candidates
    }

    /// Embeds the query and all sections in one batch, then scores.
    fn score_sections(
        &mut self,
        query: &EnrichedQuery,
        sections: Vec<Section>,
    ) -> Result<Vec<ScoredSection>> {
        let mut texts = Vec::with_capacity(sections.len() + 1);
        texts.push(query.embedding_text());
        texts.extend(sections.iter().map(Section::embedding_text));

        let mut vectors = self.engine.embed_texts(&texts)?;
        let section_vectors = vectors.split_off(1);
        let query_vector = vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("No query embedding returned"))?;

        let scorer = SimilarityScorer::new(self.config.boost.clone());
        Ok(scorer.score(
            &query_vector,
            sections,
            &section_vectors,
            &query.all_terms(),
        ))
    }

    /// Groups scored sections by source document and ranks each group
    /// with the same tie-break policy as the consolidated list.
    fn rank_per_document(
        &self,
        documents: &[Document],
        scored: Vec<ScoredSection>,
    ) -> Vec<DocumentRanking> {
        let per_doc_config = RankerConfig {
            epsilon: self.config.ranker.epsilon,
            top_n: Some(self.config.per_document_top),
        };
        let ranker = Ranker::new(per_doc_config);

        documents
            .iter()
            .map(|document| {
                let group: Vec<ScoredSection> = scored
                    .iter()
                    .filter(|s| s.section.document == document.name)
                    .cloned()
                    .collect();
                DocumentRanking {
                    document: document.name.clone(),
                    result: ranker.rank(group),
                }
            })
            .collect()
    }
}
