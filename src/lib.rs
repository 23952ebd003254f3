use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot file not found: {}. Run `docs-rag build` first", path.display())]
    MissingSnapshot { path: PathBuf },

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Failed to extract text from {file}: {message}")]
    Extraction { file: String, message: String },

    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Position {position} is out of bounds for a corpus of {len} chunks")]
    OutOfBounds { position: usize, len: usize },

    #[error("Nothing to index: {0}")]
    EmptyCorpus(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod extract;
pub mod generation;
pub mod http;
pub mod indexer;
pub mod retrieval;
pub mod server;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;
