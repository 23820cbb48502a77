// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query expansion from persona and task text.
//!
//! Keywords are extracted from the persona+task text, then expanded
//! through the persona-vocabulary and synonym tables. Expansion terms
//! are appended, never substituted: the original query text is always
//! preserved in full inside the enriched query. For a fixed descriptor
//! and fixed tables the output is identical across runs.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::DocrankError;
use crate::query::vocab::{PERSONA_VOCAB, STOP_WORDS, SYNONYMS};

/// Maximum keywords extracted from the persona+task text.
const MAX_KEYWORDS: usize = 12;

/// Maximum synonyms appended per keyword.
const MAX_SYNONYMS_PER_KEYWORD: usize = 3;

/// Expansion terms included in the embedded query text.
const MAX_EMBEDDED_TERMS: usize = 8;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").unwrap());

/// Persona, task and optional free-text query. Supplied externally,
/// immutable.
#[derive(Debug, Clone)]
pub struct QueryDescriptor {
    pub persona: String,
    pub job: String,
    pub query: Option<String>,
}

impl QueryDescriptor {
    pub fn new(persona: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            job: job.into(),
            query: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// A run needs both persona and task to expand and score
    /// meaningfully; either missing is fatal.
    pub fn validate(&self) -> Result<(), DocrankError> {
        if self.persona.trim().is_empty() {
            return Err(DocrankError::MalformedQuery("persona"));
        }
        if self.job.trim().is_empty() {
            return Err(DocrankError::MalformedQuery("job"));
        }
        Ok(())
    }
}

/// The descriptor plus its ordered expansion terms. Built once per run.
#[derive(Debug, Clone)]
pub struct EnrichedQuery {
    pub descriptor: QueryDescriptor,
    /// Keywords extracted from persona+task text, original order.
    pub keywords: Vec<String>,
    /// Appended expansion terms, deduplicated, original order.
    pub expansion_terms: Vec<String>,
}

impl EnrichedQuery {
    /// Text span handed to the embedding engine: the full original
    /// query followed by the leading expansion terms.
    pub fn embedding_text(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.descriptor.persona, &self.descriptor.job];
        if let Some(query) = &self.descriptor.query {
            parts.push(query);
        }
        for term in self.expansion_terms.iter().take(MAX_EMBEDDED_TERMS) {
            parts.push(term);
        }
        parts.join(" ").to_lowercase()
    }

    /// Keywords and expansion terms together, for boosting.
    pub fn all_terms(&self) -> Vec<String> {
        let mut terms = self.keywords.clone();
        for term in &self.expansion_terms {
            if !terms.contains(term) {
                terms.push(term.clone());
            }
        }
        terms
    }
}

/// User-supplied vocabulary overlays merged over the built-in tables.
#[derive(Debug, Clone, Default)]
pub struct ExpansionTables {
    /// Extra persona-phrase -> domain terms entries, sorted by key
    /// before use so expansion stays deterministic.
    pub persona_vocab: Vec<(String, Vec<String>)>,
    /// Extra keyword -> synonyms entries, likewise sorted.
    pub synonyms: Vec<(String, Vec<String>)>,
}

impl ExpansionTables {
    pub fn from_maps(
        persona_vocab: std::collections::HashMap<String, Vec<String>>,
        synonyms: std::collections::HashMap<String, Vec<String>>,
    ) -> Self {
        let mut persona_vocab: Vec<_> = persona_vocab.into_iter().collect();
        persona_vocab.sort_by(|a, b| a.0.cmp(&b.0));
        let mut synonyms: Vec<_> = synonyms.into_iter().collect();
        synonyms.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            persona_vocab,
            synonyms,
        }
    }
}

/// Derives an [`EnrichedQuery`] from a [`QueryDescriptor`].
pub struct QueryExpander {
    tables: ExpansionTables,
}

impl QueryExpander {
    pub fn new(tables: ExpansionTables) -> Self {
        Self { tables }
    }

    pub fn with_defaults() -> Self {
        Self::new(ExpansionTables::default())
    }

    /// Expands the descriptor. Idempotent on the additive term set:
    /// terms already present as keywords or expansions are never
    /// appended twice.
    pub fn expand(&self, descriptor: QueryDescriptor) -> Result<EnrichedQuery, DocrankError> {
        descriptor.validate()?;

        let keywords = extract_keywords(&descriptor);
        let mut expansion_terms: Vec<String> = Vec::new();

        let persona_lower = descriptor.persona.to_lowercase();
        self.for_each_persona_entry(|phrase, terms| {
            if persona_lower.contains(phrase) {
                for term in terms {
                    push_unique(&mut expansion_terms, &keywords, term);
                }
            }
        });

        for keyword in &keywords {
            self.for_each_synonym(keyword, |synonym| {
                push_unique(&mut expansion_terms, &keywords, synonym);
            });
        }

        tracing::debug!(
            keywords = keywords.len(),
            expansions = expansion_terms.len(),
            "expanded query"
        );

        Ok(EnrichedQuery {
            descriptor,
            keywords,
            expansion_terms,
        })
    }

    fn for_each_persona_entry(&self, mut f: impl FnMut(&str, Vec<&str>)) {
        for (phrase, terms) in PERSONA_VOCAB {
            f(phrase, terms.to_vec());
        }
        for (phrase, terms) in &self.tables.persona_vocab {
            f(
                &phrase.to_lowercase(),
                terms.iter().map(String::as_str).collect(),
            );
        }
    }

    fn for_each_synonym(&self, keyword: &str, mut f: impl FnMut(&str)) {
        if let Some((_, synonyms)) = SYNONYMS.iter().find(|(key, _)| *key == keyword) {
            for synonym in synonyms.iter().take(MAX_SYNONYMS_PER_KEYWORD) {
                f(synonym);
            }
        }
        if let Some((_, synonyms)) = self
            .tables
            .synonyms
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(keyword))
        {
            for synonym in synonyms.iter().take(MAX_SYNONYMS_PER_KEYWORD) {
                f(synonym);
            }
        }
    }
}

fn push_unique(terms: &mut Vec<String>, keywords: &[String], candidate: &str) {
    let candidate = candidate.to_lowercase();
    if keywords.contains(&candidate) || terms.contains(&candidate) {
        return;
    }
    terms.push(candidate);
}

/// Extracts meaningful lowercase keywords from the persona and task
/// text: alphabetic words of three or more characters, stop words
/// removed, order-preserving dedup, capped at [`MAX_KEYWORDS`].
fn extract_keywords(descriptor: &QueryDescriptor) -> Vec<String> {
    let mut combined = format!("{} {}", descriptor.persona, descriptor.job);
    if let Some(query) = &descriptor.query {
        combined.push(' ');
        combined.push_str(query);
    }
    let combined = combined.to_lowercase();

    let mut keywords = Vec::new();
    for word in WORD.find_iter(&combined) {
        let word = word.as_str();
        if STOP_WORDS.contains(word) {
            continue;
        }
        if !keywords.iter().any(|k: &String| k == word) {
            keywords.push(word.to_string());
        }
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
    }
    keywords
}
