
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embeddings::Chunk;
use crate::{RagError, Result};

pub const CORPUS_FORMAT_VERSION: u32 = 2;
const PREVIEW_CHUNKS: usize = 3;
const PREVIEW_CHARS: usize = 500;

/// Chunk metadata, positionally aligned with the vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStore {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub embedding_model: String,
    pub dimension: usize,
    /// Digest of the index these chunks were saved with, see `FlatIndex::digest`
    pub index_digest: String,
    chunks: Vec<Chunk>,
}

/// Overview of what the corpus contains
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusSummary {
    pub total_chunks: usize,
    pub total_documents: usize,
    pub documents: Vec<DocumentSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub name: String,
    pub chunks: usize,
    /// Opening text of the document's first chunks
    pub preview: String,
}

impl CorpusStore {
    #[inline]
    pub fn new(chunks: Vec<Chunk>, embedding_model: impl Into<String>, dimension: usize) -> Self {
        Self {
            version: CORPUS_FORMAT_VERSION,
            created_at: Utc::now(),
            embedding_model: embedding_model.into(),
            dimension,
            index_digest: String::new(),
            chunks,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[inline]
    pub fn lookup(&self, position: usize) -> Result<&Chunk> {
        self.chunks.get(position).ok_or(RagError::OutOfBounds {
            position,
            len: self.chunks.len(),
        })
    }

    #[inline]
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        debug!("Saved {} chunks to {}", self.len(), path.display());
        Ok(())
    }

    #[inline]
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let store: Self = serde_json::from_str(&content).map_err(|e| {
            RagError::CorruptSnapshot(format!("{} is not a valid corpus: {}", path.display(), e))
        })?;

        if store.version != CORPUS_FORMAT_VERSION {
            return Err(RagError::CorruptSnapshot(format!(
                "unsupported corpus version {} (expected {})",
                store.version, CORPUS_FORMAT_VERSION
            )));
        }

        debug!("Loaded {} chunks from {}", store.len(), path.display());
        Ok(store)
    }

    /// Per-document counts and previews, in order of first appearance
    #[inline]
    pub fn summarize(&self) -> CorpusSummary {
        let mut documents: Vec<DocumentSummary> = Vec::new();
        let mut previews: Vec<Vec<&str>> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();

        for chunk in &self.chunks {
            let slot = *slots.entry(chunk.source.as_str()).or_insert_with(|| {
                documents.push(DocumentSummary {
                    name: chunk.source.clone(),
                    chunks: 0,
                    preview: String::new(),
                });
                previews.push(Vec::new());
                documents.len() - 1
            });
            documents[slot].chunks += 1;
            if previews[slot].len() < PREVIEW_CHUNKS {
                previews[slot].push(&chunk.text);
            }
        }

        for (document, texts) in documents.iter_mut().zip(previews) {
            document.preview = texts.iter().join(" ").chars().take(PREVIEW_CHARS).collect();
        }

        CorpusSummary {
            total_chunks: self.chunks.len(),
            total_documents: documents.len(),
            documents,
        }
    }

    /// Chunk counts per format tag
    #[inline]
    pub fn format_counts(&self) -> BTreeMap<String, usize> {
        self.chunks.iter().map(|c| c.format.clone()).counts().into_iter().collect()
    }

    /// Chunk counts per source document
    #[inline]
    pub fn source_counts(&self) -> BTreeMap<String, usize> {
        self.chunks.iter().map(|c| c.source.clone()).counts().into_iter().collect()
    }
}
