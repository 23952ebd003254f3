use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use console::style;
use tracing::info;

use crate::RagError;
use crate::config::{Config, RetrievalConfig};
use crate::database::{CHUNKS_FILE, ConsistencyReport, CorpusStore, FlatIndex, INDEX_FILE};
use crate::embeddings::OllamaClient;
use crate::extract::ExtractorRegistry;
use crate::indexer::Indexer;
use crate::server;
use crate::service::AnswerService;

const PREVIEW_CHARS: usize = 150;
const PREVIEW_COUNT: usize = 3;

/// Rebuild the snapshot from every supported file in the data directory
#[inline]
pub fn build_corpus(config: &Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let data_dir = config.data_dir();
    let snapshot_dir = config.snapshot_dir();
    let registry = ExtractorRegistry::with_defaults();
    let embedder = OllamaClient::new(&config.embedding)?;
    embedder
        .health_check()
        .context("Embedding server is not ready")?;

    println!(
        "Building snapshot from {}",
        style(data_dir.display()).cyan()
    );
    let report = Indexer::new(&registry, &embedder, config.chunking.clone())
        .with_batch_size(config.embedding.batch_size as usize)
        .with_progress(true)
        .build(&data_dir, &snapshot_dir)?;

    println!("{}", style("✓ Snapshot built").green());
    println!("  Documents processed: {}", report.documents_processed);
    println!("  Chunks: {}", report.chunk_count);
    println!("  Dimension: {}", report.dimension);
    for (format, count) in &report.format_counts {
        println!("    {format}: {count} chunks");
    }
    if !report.skipped.is_empty() {
        println!("  Skipped files: {}", report.skipped.len());
        for skipped in &report.skipped {
            println!(
                "    {} {}",
                style(&skipped.filename).yellow(),
                style(format!("({})", skipped.reason)).dim()
            );
        }
    }
    println!("  Saved to: {}", style(report.snapshot_dir.display()).dim());

    Ok(())
}

/// Check the persisted snapshot and print what it contains
#[inline]
pub fn verify_snapshot(config: &Config) -> Result<()> {
    let snapshot_dir = config.snapshot_dir();
    let index_path = snapshot_dir.join(INDEX_FILE);
    let chunks_path = snapshot_dir.join(CHUNKS_FILE);
    for path in [&index_path, &chunks_path] {
        if !path.is_file() {
            return Err(RagError::MissingSnapshot { path: path.clone() }.into());
        }
    }

    let index = FlatIndex::load(&index_path)?;
    let corpus = CorpusStore::load(&chunks_path)?;
    let report = ConsistencyReport::check(&index, &corpus);

    println!("{}", style("🔍 Snapshot Verification").bold().cyan());
    println!("  Location: {}", style(snapshot_dir.display()).dim());
    println!("  Vectors: {}", report.index_vectors);
    println!("  Chunks: {}", report.corpus_chunks);
    println!("  Dimension: {}", report.index_dimension);
    println!(
        "  Built: {} with {}",
        corpus.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        style(&corpus.embedding_model).cyan()
    );

    if !report.is_consistent {
        println!("{}", style(format!("✗ {}", report.summary())).red());
        bail!("Snapshot is inconsistent; run `docs-rag build` to rebuild it");
    }
    println!("{}", style(format!("✓ {}", report.summary())).green());

    println!();
    println!("{}", style("Sample chunks:").bold().yellow());
    for chunk in corpus.chunks().iter().take(PREVIEW_COUNT) {
        println!(
            "  [{}] {}: {}",
            chunk.chunk_id,
            style(&chunk.source).cyan(),
            preview(&chunk.text, PREVIEW_CHARS)
        );
    }

    println!();
    println!("{}", style("Chunks per document:").bold().yellow());
    for (source, count) in corpus.source_counts() {
        println!("  {source}: {count}");
    }

    Ok(())
}

/// Answer one question from the command line
#[inline]
pub fn ask_question(config: &Config, question: &str, top_k: Option<usize>) -> Result<()> {
    let top_k = top_k.map(RetrievalConfig::check_top_k).transpose()?;
    let service = AnswerService::from_config(config)?;
    let k = top_k.unwrap_or_else(|| service.top_k());
    let answer = service.ask_with_k(question, k)?;

    println!("{}", answer.answer);
    println!();
    if answer.sources.is_empty() {
        println!("{}", style("No sources found").dim());
    } else {
        println!(
            "{} {}",
            style("Sources:").bold(),
            style(answer.sources.join(", ")).cyan()
        );
    }
    info!(
        "Similarity scores: {:?}",
        answer.debug.similarity_scores
    );

    Ok(())
}

/// Load the service once and serve HTTP requests until interrupted
#[inline]
pub fn serve(config: &Config, host: &str, port: u16) -> Result<()> {
    let service = Arc::new(AnswerService::from_config(config)?);
    let address = format!("{host}:{port}");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(server::serve(service, &address))
}

/// Ensure a user supplied directory exists before it is used as the data directory
#[inline]
pub fn require_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        bail!("Directory not found: {}", path.display())
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let flattened = text.replace(['\n', '\r'], " ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    let truncated: String = flattened.chars().take(max_chars).collect();
    format!("{truncated}...")
}
