// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quality gate applied to section candidates before embedding.
//!
//! Filtering is a pure, order-preserving subset operation: surviving
//! sections keep their original relative order. The near-duplicate
//! seen-set spans the whole run, so the same section text appearing in
//! two documents is only embedded once.

use std::collections::HashSet;

/// Thresholds for the section quality gate. All tunable; defaults are
/// deterministic for identical input.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Minimum title length in characters.
    pub min_title_len: usize,
    /// Minimum body length in characters.
    pub min_body_len: usize,
    /// Maximum body length in characters (embedding models degrade on
    /// very long spans).
    pub max_body_len: usize,
    /// Minimum fraction of alphabetic/whitespace characters in the body.
    pub min_alpha_ratio: f32,
    /// Minimum fraction of distinct words (repetition gate).
    pub min_vocab_ratio: f32,
    /// Maximum fraction of very short words (<= 2 chars).
    pub max_short_word_ratio: f32,
    /// When fewer sections than this survive, rerun with relaxed
    /// length thresholds.
    pub relax_below: usize,
    /// Optional hard cap on surviving sections per run.
    pub max_sections: Option<usize>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_title_len: 3,
            min_body_len: 20,
            max_body_len: 1000,
            min_alpha_ratio: 0.6,
            min_vocab_ratio: 0.3,
            max_short_word_ratio: 0.5,
            relax_below: 5,
            max_sections: None,
        }
    }
}

/// Relaxed length thresholds used by the fallback pass.
const RELAXED_MIN_TITLE_LEN: usize = 2;
const RELAXED_MIN_BODY_LEN: usize = 15;

/// Order-preserving quality filter. Each `filter` call owns its
/// duplicate seen-set, spanning all documents of that run.
pub struct SectionFilter {
    config: FilterConfig,
}

impl SectionFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FilterConfig::default())
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Filters the run's section candidates down to the high-quality
    /// subset, preserving relative order.
    ///
    /// If the strict pass leaves fewer than `relax_below` sections the
    /// length thresholds are relaxed and the pass rerun, so sparse
    /// collections still produce a ranking.
    pub fn filter(&self, sections: Vec<crate::extract::Section>) -> Vec<crate::extract::Section> {
        let strict: Vec<crate::extract::Section> = {
            let mut seen = HashSet::new();
            sections
                .iter()
                .filter(|s| self.passes(s, false, &mut seen))
                .cloned()
                .collect()
        };

        let mut survivors = if strict.len() >= self.config.relax_below {
            strict
        } else {
            tracing::debug!(
                strict = strict.len(),
                threshold = self.config.relax_below,
                "relaxing filter thresholds for sparse collection"
            );
            let mut seen = HashSet::new();
            sections
                .iter()
                .filter(|s| self.passes(s, true, &mut seen))
                .cloned()
                .collect()
        };

        if let Some(cap) = self.config.max_sections {
            survivors.truncate(cap);
        }

        survivors
    }

    fn passes(
        &self,
        section: &crate::extract::Section,
        relaxed: bool,
        seen: &mut HashSet<String>,
    ) -> bool {
        let (min_title, min_body) = if relaxed {
            (RELAXED_MIN_TITLE_LEN, RELAXED_MIN_BODY_LEN)
        } else {
            (self.config.min_title_len, self.config.min_body_len)
        };

        let title = section.title.trim();
        let body = section.body.trim();

        if title.len() < min_title || body.len() < min_body {
            return false;
        }
        if body.len() > self.config.max_body_len {
            return false;
        }
        if !relaxed && is_low_quality(body, &self.config) {
            return false;
        }
        // Near-duplicate within this run.
        seen.insert(normalize_for_dedup(body))
    }
}

/// Collapses a body to its alphanumeric essence for duplicate detection.
fn normalize_for_dedup(body: &str) -> String {
    body.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Detects mostly-numeric, highly repetitive or fragmentary bodies.
fn is_low_quality(body: &str, config: &FilterConfig) -> bool {
    let total = body.chars().count();
    if total == 0 {
        return true;
    }

    let alpha = body
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .count();
    if (alpha as f32) < (total as f32) * config.min_alpha_ratio {
        return true;
    }

    let words: Vec<&str> = body.split_whitespace().collect();
    if words.is_empty() {
        return true;
    }

    let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
    if (unique.len() as f32) < (words.len() as f32) * config.min_vocab_ratio {
        return true;
    }

    let short = words.iter().filter(|w| w.chars().count() <= 2).count();
    if (short as f32) > (words.len() as f32) * config.max_short_word_ratio {
        return true;
    }

    false
}
