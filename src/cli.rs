// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// docrank - Persona-driven semantic ranking of document sections
///
/// Ranks extracted document sections by semantic relevance to a
/// persona and task, using multi-layer embedding similarity.
#[derive(Parser, Debug)]
#[command(name = "docrank")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Embedding backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliBackend {
    /// fastembed MiniLM model (downloads on first use)
    Fastembed,
    /// Deterministic hash projection (no model download)
    Hash,
    /// Zero vectors (diagnostics only)
    Dummy,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank document sections against a persona and task
    Rank {
        /// Collection manifest JSON (persona, job_to_be_done, documents)
        #[arg(short = 'c', long)]
        collection: Option<String>,

        /// Directory of extracted .txt documents (pages separated by
        /// form feed). Defaults to the manifest's directory.
        #[arg(short, long)]
        docs: Option<String>,

        /// Persona role (overrides the manifest)
        #[arg(short, long)]
        persona: Option<String>,

        /// Task / job to be done (overrides the manifest)
        #[arg(short, long)]
        job: Option<String>,

        /// Optional free-text query appended to persona and task
        #[arg(short, long)]
        query: Option<String>,

        /// Maximum entries in the consolidated ranking
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Number of trailing model layers to average
        #[arg(long)]
        layers: Option<usize>,

        /// Run the backend model in reduced precision
        #[arg(long)]
        quantized: bool,

        /// Embedding backend
        #[arg(long, value_enum)]
        backend: Option<CliBackend>,

        /// Write the JSON report to this file in addition to stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
