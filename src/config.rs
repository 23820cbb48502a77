// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for docrank
//!
//! Loads configuration from .docrankrc.toml in the current directory or
//! ~/.config/docrank/config.toml. Every pipeline knob has a deterministic
//! default; the file only needs the values being overridden.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::embedding::EngineConfig;
use crate::extract::FilterConfig;
use crate::query::ExpansionTables;
use crate::rank::{BoostConfig, RankerConfig};

/// Embedding backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// fastembed MiniLM model (downloads on first use).
    #[default]
    Fastembed,
    /// Deterministic hash projection, no model required.
    Hash,
    /// Zero vectors (fallback/diagnostics).
    Dummy,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fastembed" => Ok(BackendKind::Fastembed),
            "hash" => Ok(BackendKind::Hash),
            "dummy" => Ok(BackendKind::Dummy),
            _ => Err(format!("Unknown backend: {}", s)),
        }
    }
}

/// Section filter thresholds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    pub min_title_len: Option<usize>,
    pub min_body_len: Option<usize>,
    pub max_body_len: Option<usize>,
    pub min_alpha_ratio: Option<f32>,
    pub min_vocab_ratio: Option<f32>,
    pub max_short_word_ratio: Option<f32>,
    pub relax_below: Option<usize>,
    pub max_sections: Option<usize>,
}

impl FilterSection {
    pub fn to_filter_config(&self) -> FilterConfig {
        let defaults = FilterConfig::default();
        FilterConfig {
            min_title_len: self.min_title_len.unwrap_or(defaults.min_title_len),
            min_body_len: self.min_body_len.unwrap_or(defaults.min_body_len),
            max_body_len: self.max_body_len.unwrap_or(defaults.max_body_len),
            min_alpha_ratio: self.min_alpha_ratio.unwrap_or(defaults.min_alpha_ratio),
            min_vocab_ratio: self.min_vocab_ratio.unwrap_or(defaults.min_vocab_ratio),
            max_short_word_ratio: self
                .max_short_word_ratio
                .unwrap_or(defaults.max_short_word_ratio),
            relax_below: self.relax_below.unwrap_or(defaults.relax_below),
            max_sections: self.max_sections.or(defaults.max_sections),
        }
    }
}

/// Embedding engine and backend options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddingSection {
    /// Backend kind (fastembed, hash, dummy).
    pub backend: Option<BackendKind>,
    /// Number of trailing model layers to average.
    pub layers: Option<usize>,
    /// Reduced-precision execution of the backend model.
    pub quantized: Option<bool>,
    /// Head-truncation cutoff in characters.
    pub max_chars: Option<usize>,
}

impl EmbeddingSection {
    pub fn backend(&self) -> BackendKind {
        self.backend.unwrap_or_default()
    }

    pub fn quantized(&self) -> bool {
        self.quantized.unwrap_or(false)
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            layers: self.layers.unwrap_or(defaults.layers),
            max_chars: self.max_chars.unwrap_or(defaults.max_chars),
        }
    }
}

/// Ranking and boosting options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RankingSection {
    /// Tie epsilon for equal-score detection.
    pub epsilon: Option<f32>,
    /// Consolidated result cutoff.
    pub top_n: Option<usize>,
    /// Per-document result cutoff.
    pub per_document_top: Option<usize>,
    /// Persona-aware score boosting.
    pub boost: Option<bool>,
}

impl RankingSection {
    pub fn to_ranker_config(&self) -> RankerConfig {
        let defaults = RankerConfig::default();
        RankerConfig {
            epsilon: self.epsilon.unwrap_or(defaults.epsilon),
            top_n: self.top_n.or(defaults.top_n),
        }
    }

    pub fn to_boost_config(&self) -> BoostConfig {
        BoostConfig {
            enabled: self.boost.unwrap_or(true),
            ..BoostConfig::default()
        }
    }

    pub fn per_document_top(&self) -> usize {
        self.per_document_top
            .unwrap_or(crate::pipeline::DEFAULT_PER_DOCUMENT_TOP)
    }
}

/// User vocabulary overlays merged over the built-in tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExpansionSection {
    /// Persona phrase -> domain terms.
    pub persona_vocab: HashMap<String, Vec<String>>,
    /// Keyword -> synonyms.
    pub synonyms: HashMap<String, Vec<String>>,
}

impl ExpansionSection {
    pub fn to_tables(&self) -> ExpansionTables {
        ExpansionTables::from_maps(self.persona_vocab.clone(), self.synonyms.clone())
    }
}

/// Configuration loaded from .docrankrc.toml or ~/.config/docrank/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterSection,

    #[serde(default)]
    pub embeddings: EmbeddingSection,

    #[serde(default)]
    pub ranking: RankingSection,

    #[serde(default)]
    pub expansion: ExpansionSection,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .docrankrc.toml in current directory
    /// 2. ~/.config/docrank/config.toml
    pub fn load() -> Self {
        if let Some(config) = Self::load_from_path(&PathBuf::from(".docrankrc.toml")) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("docrank").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    fn load_from_path(path: &PathBuf) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }
}
