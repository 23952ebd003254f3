// Indexer module
// Builds a snapshot from a directory of documents: extract, chunk, embed, persist


use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::database::{CorpusStore, FlatIndex, Snapshot};
use crate::embeddings::{ChunkingConfig, Embedder, split};
use crate::extract::{DocumentBlob, ExtractorRegistry};
use crate::{RagError, Result};

pub const DEFAULT_EMBED_BATCH_SIZE: usize = 32;

/// Why a file in the data directory did not contribute chunks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unsupported,
    NoText,
    Failed(String),
}

impl fmt::Display for SkipReason {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("unsupported format"),
            Self::NoText => f.write_str("no extractable text"),
            Self::Failed(message) => write!(f, "extraction failed: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub filename: String,
    pub reason: SkipReason,
}

/// Outcome of a full rebuild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub documents_processed: usize,
    pub skipped: Vec<SkippedDocument>,
    pub chunk_count: usize,
    pub dimension: usize,
    pub format_counts: BTreeMap<String, usize>,
    pub snapshot_dir: PathBuf,
}

/// Full-rebuild ingestion pipeline
pub struct Indexer<'a> {
    registry: &'a ExtractorRegistry,
    embedder: &'a dyn Embedder,
    chunking: ChunkingConfig,
    batch_size: usize,
    show_progress: bool,
}

impl<'a> Indexer<'a> {
    #[inline]
    pub fn new(
        registry: &'a ExtractorRegistry,
        embedder: &'a dyn Embedder,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            registry,
            embedder,
            chunking,
            batch_size: DEFAULT_EMBED_BATCH_SIZE,
            show_progress: false,
        }
    }

    #[inline]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Draw a progress bar on an attended terminal
    #[inline]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Extract every regular file directly inside `data_dir`, in name order
    ///
    /// Unsupported, blank and unreadable files are reported rather than failing
    /// the whole scan.
    #[inline]
    pub fn collect_documents(
        &self,
        data_dir: &Path,
    ) -> Result<(Vec<DocumentBlob>, Vec<SkippedDocument>)> {
        if !data_dir.is_dir() {
            return Err(RagError::Config(format!(
                "data directory {} does not exist",
                data_dir.display()
            )));
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(data_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut documents = Vec::new();
        let mut skipped = Vec::new();
        for path in paths {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            if !self.registry.is_supported(&path) {
                debug!("Skipping unsupported file {}", filename);
                skipped.push(SkippedDocument {
                    filename,
                    reason: SkipReason::Unsupported,
                });
                continue;
            }

            match self.registry.extract(&path) {
                Ok(document) if document.text.trim().is_empty() => {
                    warn!("No text extracted from {}", filename);
                    skipped.push(SkippedDocument {
                        filename,
                        reason: SkipReason::NoText,
                    });
                }
                Ok(document) => {
                    info!(
                        "Extracted {} chars from {}",
                        document.text.chars().count(),
                        filename
                    );
                    documents.push(document);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", filename, e);
                    skipped.push(SkippedDocument {
                        filename,
                        reason: SkipReason::Failed(e.to_string()),
                    });
                }
            }
        }

        Ok((documents, skipped))
    }

    /// Chunk and embed `documents` into an aligned snapshot
    #[inline]
    pub fn build_snapshot(&self, documents: &[DocumentBlob]) -> Result<Snapshot> {
        let chunks = split(documents, &self.chunking)?;
        if chunks.is_empty() {
            return Err(RagError::EmptyCorpus(
                "documents produced no chunks".to_string(),
            ));
        }
        info!(
            "Split {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let bar = self.progress_bar(texts.len() as u64);
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let embedded = self.embedder.embed(batch)?;
            if embedded.len() != batch.len() {
                bar.abandon();
                return Err(RagError::Embedding(format!(
                    "embedder returned {} vectors for {} texts",
                    embedded.len(),
                    batch.len()
                )));
            }
            vectors.extend(embedded);
            bar.inc(batch.len() as u64);
        }
        bar.finish_and_clear();

        let index = FlatIndex::build(&vectors)?;
        let dimension = index.dimension();
        let corpus = CorpusStore::new(chunks, self.embedder.model_name(), dimension);
        Snapshot::new(index, corpus)
    }

    /// Rebuild the snapshot in `snapshot_dir` from the files in `data_dir`
    #[inline]
    pub fn build(&self, data_dir: &Path, snapshot_dir: &Path) -> Result<BuildReport> {
        info!("Building snapshot from {}", data_dir.display());
        let (documents, skipped) = self.collect_documents(data_dir)?;
        if documents.is_empty() {
            return Err(RagError::EmptyCorpus(format!(
                "no supported documents with text in {} (supported: {})",
                data_dir.display(),
                self.registry.supported_extensions().join(" ")
            )));
        }

        let snapshot = self.build_snapshot(&documents)?;
        snapshot.save(snapshot_dir)?;

        Ok(BuildReport {
            documents_processed: documents.len(),
            skipped,
            chunk_count: snapshot.len(),
            dimension: snapshot.dimension(),
            format_counts: snapshot.corpus().format_counts(),
            snapshot_dir: snapshot_dir.to_path_buf(),
        })
    }

    fn progress_bar(&self, length: u64) -> ProgressBar {
        if !self.show_progress || !console::user_attended_stderr() {
            return ProgressBar::hidden();
        }
        let style = ProgressStyle::with_template("{bar:40} [{pos}/{len}] Embedding chunks {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        ProgressBar::new(length).with_style(style)
    }
}
