// Question answering service
// Built once at startup and shared read-only by every request


use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::database::{CorpusSummary, Snapshot};
use crate::embeddings::{Embedder, OllamaClient};
use crate::generation::{self, Generator};
use crate::retrieval::{Retriever, assemble, build_prompt};
use crate::{RagError, Result};

/// Answer to one question, with the documents it drew on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<String>,
    pub debug: AnswerDebug,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerDebug {
    pub chunks_found: usize,
    /// Squared distances of the retrieved chunks, closest first
    pub similarity_scores: Vec<f32>,
}

pub struct AnswerService {
    embedder: Box<dyn Embedder>,
    generator: Box<dyn Generator>,
    snapshot: Snapshot,
    summary: CorpusSummary,
    top_k: usize,
}

impl AnswerService {
    #[inline]
    pub fn new(
        embedder: Box<dyn Embedder>,
        generator: Box<dyn Generator>,
        snapshot: Snapshot,
        top_k: usize,
    ) -> Self {
        let summary = snapshot.summarize();
        Self {
            embedder,
            generator,
            snapshot,
            summary,
            top_k,
        }
    }

    /// Load the snapshot and connect to the embedding and generation backends
    ///
    /// Fails if the embedding model is unavailable or produces vectors of a
    /// different dimensionality than the snapshot.
    #[inline]
    pub fn from_config(config: &Config) -> Result<Self> {
        let snapshot = Snapshot::load(&config.snapshot_dir())?;

        let embedder = OllamaClient::new(&config.embedding)?;
        embedder.health_check()?;
        if embedder.model_name() != snapshot.corpus().embedding_model {
            warn!(
                "Snapshot was built with '{}' but the configured model is '{}'",
                snapshot.corpus().embedding_model,
                embedder.model_name()
            );
        }

        let probe = embedder.embed_one("dimension probe")?;
        if probe.len() != snapshot.dimension() {
            return Err(RagError::CorruptSnapshot(format!(
                "model '{}' produces {} dimensions but the snapshot holds {}",
                embedder.model_name(),
                probe.len(),
                snapshot.dimension()
            )));
        }

        let generator = generation::from_config(&config.generation)?;

        info!(
            "Answer service ready with {} chunks from {} documents",
            snapshot.len(),
            snapshot.corpus().source_counts().len()
        );
        Ok(Self::new(
            Box::new(embedder),
            generator,
            snapshot,
            config.retrieval.top_k,
        ))
    }

    #[inline]
    pub fn ask(&self, question: &str) -> Result<Answer> {
        self.ask_with_k(question, self.top_k)
    }

    #[inline]
    pub fn ask_with_k(&self, question: &str, k: usize) -> Result<Answer> {
        let retriever = Retriever::new(self.embedder.as_ref(), &self.snapshot);
        let results = retriever.retrieve(question, k)?;

        let context = assemble(&results);
        let prompt = build_prompt(question, &context);
        debug!(
            "Built prompt of {} chars from {} fragments",
            prompt.len(),
            results.len()
        );

        let answer = self.generator.generate(&prompt)?;

        Ok(Answer {
            answer,
            sources: context.sources,
            debug: AnswerDebug {
                chunks_found: results.len(),
                similarity_scores: results.iter().map(|r| r.score).collect(),
            },
        })
    }

    #[inline]
    pub fn summary(&self) -> &CorpusSummary {
        &self.summary
    }

    #[inline]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }
}
