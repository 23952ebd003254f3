// Retrieval module
// Question embedding, nearest-neighbor lookup and context assembly


pub mod context;

pub use context::{AssembledContext, assemble, build_prompt};

use serde::Serialize;
use tracing::{debug, warn};

use crate::database::Snapshot;
use crate::embeddings::{Chunk, Embedder};
use crate::{RagError, Result};

/// A retrieved chunk and its squared distance to the question, lower is closer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub chunk: Chunk,
    pub score: f32,
}

/// Finds the chunks nearest to a question
pub struct Retriever<'a> {
    embedder: &'a dyn Embedder,
    snapshot: &'a Snapshot,
}

impl<'a> Retriever<'a> {
    #[inline]
    pub fn new(embedder: &'a dyn Embedder, snapshot: &'a Snapshot) -> Self {
        Self { embedder, snapshot }
    }

    /// Up to `k` chunks, closest first
    ///
    /// Blank questions are rejected before the embedder is called.
    #[inline]
    pub fn retrieve(&self, question: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        if question.trim().is_empty() {
            return Err(RagError::EmptyQuestion);
        }

        let query = self.embedder.embed_one(question)?;
        if query.len() != self.snapshot.dimension() {
            return Err(RagError::CorruptSnapshot(format!(
                "model '{}' produced {} dimensions but the index holds {}",
                self.embedder.model_name(),
                query.len(),
                self.snapshot.dimension()
            )));
        }

        let neighbors = self.snapshot.index().search(&query, k)?;
        let mut results = Vec::with_capacity(neighbors.len());
        for (position, score) in neighbors {
            match self.snapshot.corpus().lookup(position) {
                Ok(chunk) => results.push(RetrievalResult {
                    chunk: chunk.clone(),
                    score,
                }),
                Err(e) => warn!("Skipping index position without a chunk: {}", e),
            }
        }

        debug!(
            "Retrieved {} chunks for question of {} chars",
            results.len(),
            question.chars().count()
        );
        Ok(results)
    }
}
