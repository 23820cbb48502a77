// SPDX-License-Identifier: MIT OR Apache-2.0

//! docrank - Persona-driven semantic ranking of document sections
//!
//! Thin operational layer around the ranking pipeline: argument
//! parsing, config loading, document I/O and report printing.

mod cli;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use cli::{Cli, CliBackend, Commands, OutputFormat};
use docrank::config::{BackendKind, Config};
use docrank::document::{self, CollectionManifest, DocumentEntry};
use docrank::embedding::{
    DummyBackend, EmbeddingBackend, EmbeddingEngine, EngineConfig, FastEmbedBackend, HashBackend,
};
use docrank::output::Report;
use docrank::pipeline::{Pipeline, PipelineConfig};
use docrank::query::{QueryDescriptor, QueryExpander};
use docrank::rank::RankerConfig;

fn main() -> Result<()> {
    // Initialize tracing with DOCRANK_LOG env var (e.g., DOCRANK_LOG=debug docrank rank ...)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DOCRANK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    match cli.command {
        Commands::Rank {
            collection,
            docs,
            persona,
            job,
            query,
            top_n,
            layers,
            quantized,
            backend,
            output,
        } => run_rank(RankArgs {
            collection,
            docs,
            persona,
            job,
            query,
            top_n,
            layers,
            quantized,
            backend,
            output,
            format,
        }),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "docrank", &mut std::io::stdout());
            Ok(())
        }
    }
}

struct RankArgs {
    collection: Option<String>,
    docs: Option<String>,
    persona: Option<String>,
    job: Option<String>,
    query: Option<String>,
    top_n: Option<usize>,
    layers: Option<usize>,
    quantized: bool,
    backend: Option<CliBackend>,
    output: Option<String>,
    format: OutputFormat,
}

fn run_rank(args: RankArgs) -> Result<()> {
    let config = Config::load();

    let (descriptor, entries, docs_dir) = resolve_inputs(&args)?;

    let (documents, mut failures) = document::load_documents(&entries, &docs_dir);
    if documents.is_empty() {
        bail!("No readable documents found in {}", docs_dir.display());
    }

    let mut pipeline = build_pipeline(&args, &config)?;

    let query = QueryExpander::new(config.expansion.to_tables()).expand(descriptor)?;
    let mut run_output = pipeline.run_expanded(query, &documents)?;
    run_output.failures.append(&mut failures);

    let input_documents = documents.iter().map(|d| d.name.clone()).collect();
    let report = Report::from_run(&run_output, input_documents);

    let rendered = match args.format {
        OutputFormat::Text => report.render_text(),
        OutputFormat::Json => report.to_json()?,
    };
    println!("{}", rendered);

    if let Some(path) = &args.output {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("Failed to write report: {}", path))?;
        tracing::info!(path, "wrote JSON report");
    }

    Ok(())
}

/// Resolves the query descriptor, document entries and documents
/// directory from CLI flags and the optional manifest.
fn resolve_inputs(args: &RankArgs) -> Result<(QueryDescriptor, Vec<DocumentEntry>, PathBuf)> {
    if let Some(manifest_path) = &args.collection {
        let manifest_path = Path::new(manifest_path);
        let manifest = CollectionManifest::load(manifest_path)?;

        let docs_dir = args
            .docs
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| manifest_path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        let persona = args
            .persona
            .clone()
            .unwrap_or_else(|| manifest.persona.role.clone());
        let job = args
            .job
            .clone()
            .unwrap_or_else(|| manifest.job_to_be_done.task.clone());

        let mut descriptor = QueryDescriptor::new(persona, job);
        if let Some(query) = &args.query {
            descriptor = descriptor.with_query(query.clone());
        }

        let entries = if manifest.documents.is_empty() {
            scan_entries(&docs_dir)
        } else {
            manifest.documents
        };

        return Ok((descriptor, entries, docs_dir));
    }

    let docs_dir = match &args.docs {
        Some(dir) => PathBuf::from(dir),
        None => bail!("Either --collection or --docs is required"),
    };
    let (Some(persona), Some(job)) = (&args.persona, &args.job) else {
        bail!("--persona and --job are required when no --collection manifest is given");
    };

    let mut descriptor = QueryDescriptor::new(persona.clone(), job.clone());
    if let Some(query) = &args.query {
        descriptor = descriptor.with_query(query.clone());
    }

    Ok((descriptor, scan_entries(&docs_dir), docs_dir))
}

fn scan_entries(docs_dir: &Path) -> Vec<DocumentEntry> {
    document::scan_documents_dir(docs_dir)
        .into_iter()
        .filter_map(|path| {
            path.strip_prefix(docs_dir)
                .ok()
                .map(|rel| rel.to_string_lossy().into_owned())
        })
        .map(|filename| DocumentEntry {
            filename,
            title: None,
        })
        .collect()
}

fn build_pipeline(args: &RankArgs, config: &Config) -> Result<Pipeline> {
    let backend_kind = match args.backend {
        Some(CliBackend::Fastembed) => BackendKind::Fastembed,
        Some(CliBackend::Hash) => BackendKind::Hash,
        Some(CliBackend::Dummy) => BackendKind::Dummy,
        None => config.embeddings.backend(),
    };
    let quantized = args.quantized || config.embeddings.quantized();

    // Backend availability is checked here, before any extraction work:
    // a missing model is fatal for the whole run.
    let backend: Box<dyn EmbeddingBackend> = match backend_kind {
        BackendKind::Fastembed => Box::new(FastEmbedBackend::new(quantized)?),
        BackendKind::Hash => Box::new(HashBackend::with_defaults()),
        BackendKind::Dummy => Box::new(DummyBackend::new(384)),
    };

    let mut engine_config: EngineConfig = config.embeddings.to_engine_config();
    if let Some(layers) = args.layers {
        engine_config.layers = layers;
    }
    let engine = EmbeddingEngine::new(backend, engine_config);

    let ranker_config = RankerConfig {
        top_n: args.top_n.or(config.ranking.to_ranker_config().top_n),
        ..config.ranking.to_ranker_config()
    };

    let pipeline_config = PipelineConfig {
        filter: config.filter.to_filter_config(),
        ranker: ranker_config,
        boost: config.ranking.to_boost_config(),
        per_document_top: config.ranking.per_document_top(),
        show_progress: args.format == OutputFormat::Text,
    };

    Ok(Pipeline::new(engine, pipeline_config))
}
