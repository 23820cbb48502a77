// SPDX-License-Identifier: MIT OR Apache-2.0

//! Final ordering and tie-breaking of scored sections.
//!
//! Produces a strict total order: higher score first; scores landing
//! in the same epsilon-wide bucket fall back to earlier page, then
//! longer body, then document id and extraction position. Ties never
//! resolve by incidental input order.

use std::cmp::Ordering;

use crate::rank::scorer::ScoredSection;

/// Default epsilon within which two scores count as tied.
pub const DEFAULT_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Bucket width for tie detection: scores quantized into the same
    /// epsilon-wide bucket count as tied. Zero disables tie detection.
    pub epsilon: f32,
    /// Optional top-N cutoff for the output.
    pub top_n: Option<usize>,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            top_n: None,
        }
    }
}

/// Ordered, terminal artifact of one pipeline run.
#[derive(Debug, Clone)]
pub struct RankedResult {
    pub entries: Vec<ScoredSection>,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Orders scored sections into a [`RankedResult`].
pub struct Ranker {
    config: RankerConfig,
}

impl Ranker {
    pub fn new(config: RankerConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(RankerConfig::default())
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Sorts, truncates to top-N when configured, and assigns 1-based
    /// ranks.
    pub fn rank(&self, mut scored: Vec<ScoredSection>) -> RankedResult {
        let epsilon = self.config.epsilon;
        scored.sort_by(|a, b| compare(a, b, epsilon));

        if let Some(top_n) = self.config.top_n {
            scored.truncate(top_n);
        }

        for (idx, entry) in scored.iter_mut().enumerate() {
            entry.rank = idx + 1;
        }

        RankedResult { entries: scored }
    }
}

/// Total-order comparator: descending epsilon bucket, then the tie
/// keys. Quantizing into buckets keeps the order total even when
/// scores chain within epsilon of each other (a~b, b~c, a!~c), which a
/// pairwise epsilon test cannot.
fn compare(a: &ScoredSection, b: &ScoredSection, epsilon: f32) -> Ordering {
    let by_score = if epsilon > 0.0 {
        score_bucket(b.score, epsilon).cmp(&score_bucket(a.score, epsilon))
    } else {
        b.score.total_cmp(&a.score)
    };

    by_score
        .then_with(|| a.section.page.cmp(&b.section.page))
        .then_with(|| b.section.body.len().cmp(&a.section.body.len()))
        .then_with(|| a.section.document.cmp(&b.section.document))
        .then_with(|| a.section.position.cmp(&b.section.position))
}

fn score_bucket(score: f32, epsilon: f32) -> i64 {
    (f64::from(score) / f64::from(epsilon)).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{Section, SectionKind};

    fn scored(score: f32, page: u32, body_len: usize, document: &str, position: usize) -> ScoredSection {
        ScoredSection {
            section: Section {
                document: document.into(),
                page,
                position,
                title: format!("Section {}", position),
                body: "x".repeat(body_len),
                kind: SectionKind::Heading,
            },
            score,
            rank: 0,
        }
    }

    #[test]
    fn higher_score_ranks_first() {
        let ranker = Ranker::with_defaults();
        let result = ranker.rank(vec![
            scored(0.2, 1, 10, "a.txt", 0),
            scored(0.9, 5, 10, "a.txt", 1),
            scored(0.5, 1, 10, "a.txt", 2),
        ]);

        let scores: Vec<f32> = result.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![0.9, 0.5, 0.2]);
        assert_eq!(result.entries[0].rank, 1);
        assert_eq!(result.entries[2].rank, 3);
    }

    #[test]
    fn tie_breaks_on_earlier_page_then_longer_body() {
        let ranker = Ranker::with_defaults();
        let result = ranker.rank(vec![
            scored(0.5, 3, 100, "a.txt", 0),
            scored(0.5, 1, 50, "a.txt", 1),
            scored(0.5, 1, 200, "a.txt", 2),
        ]);

        // Page 1 entries first; within page 1 the longer body wins.
        assert_eq!(result.entries[0].section.position, 2);
        assert_eq!(result.entries[1].section.position, 1);
        assert_eq!(result.entries[2].section.position, 0);
    }

    #[test]
    fn ties_are_independent_of_input_order() {
        let ranker = Ranker::with_defaults();
        let a = scored(0.5, 2, 80, "a.txt", 0);
        let b = scored(0.5, 1, 80, "b.txt", 0);
        let c = scored(0.5, 1, 90, "c.txt", 0);

        let forward = ranker.rank(vec![a.clone(), b.clone(), c.clone()]);
        let reverse = ranker.rank(vec![c, b, a]);

        let order = |r: &RankedResult| -> Vec<String> {
            r.entries
                .iter()
                .map(|e| e.section.document.clone())
                .collect()
        };
        assert_eq!(order(&forward), order(&reverse));
        assert_eq!(order(&forward), vec!["c.txt", "b.txt", "a.txt"]);
    }

    #[test]
    fn chained_near_ties_are_input_order_independent() {
        // Scores that chain within epsilon pairwise (a~b, b~c) without
        // a and c being within epsilon of each other still sort the
        // same way from any input order.
        let ranker = Ranker::with_defaults();
        let a = scored(0.5, 1, 10, "a.txt", 0);
        let b = scored(0.5 + 0.9e-6, 2, 10, "b.txt", 0);
        let c = scored(0.5 + 1.8e-6, 3, 10, "c.txt", 0);

        let forward = ranker.rank(vec![a.clone(), b.clone(), c.clone()]);
        let reverse = ranker.rank(vec![c.clone(), b.clone(), a.clone()]);
        let rotated = ranker.rank(vec![b, c, a]);

        let pages = |r: &RankedResult| -> Vec<u32> {
            r.entries.iter().map(|e| e.section.page).collect()
        };
        assert_eq!(pages(&forward), pages(&reverse));
        assert_eq!(pages(&forward), pages(&rotated));
        for (idx, entry) in forward.entries.iter().enumerate() {
            assert_eq!(entry.rank, idx + 1);
        }
    }

    #[test]
    fn scores_within_epsilon_are_tied() {
        let ranker = Ranker::new(RankerConfig {
            epsilon: 0.01,
            top_n: None,
        });
        // 0.500 vs 0.505: tied under epsilon, page decides.
        let result = ranker.rank(vec![
            scored(0.505, 2, 10, "a.txt", 0),
            scored(0.500, 1, 10, "a.txt", 1),
        ]);
        assert_eq!(result.entries[0].section.page, 1);
    }

    #[test]
    fn top_n_truncates_output() {
        let ranker = Ranker::new(RankerConfig {
            epsilon: DEFAULT_EPSILON,
            top_n: Some(2),
        });
        let result = ranker.rank(vec![
            scored(0.1, 1, 10, "a.txt", 0),
            scored(0.2, 1, 10, "a.txt", 1),
            scored(0.3, 1, 10, "a.txt", 2),
        ]);
        assert_eq!(result.len(), 2);
        assert_eq!(result.entries[0].score, 0.3);
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let result = Ranker::with_defaults().rank(Vec::new());
        assert!(result.is_empty());
    }
}
