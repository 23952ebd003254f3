#[cfg(test)]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::corpus::{CorpusStore, CorpusSummary};
use super::vector_index::FlatIndex;
use crate::{RagError, Result};

pub const INDEX_FILE: &str = "index.bin";
pub const CHUNKS_FILE: &str = "chunks.json";

/// Integrity of an (index, corpus) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
    pub index_vectors: usize,
    pub index_dimension: usize,
    pub corpus_chunks: usize,
    pub corpus_dimension: usize,
    /// The corpus was saved together with exactly this index
    pub digest_matches: bool,
    pub is_consistent: bool,
}

impl ConsistencyReport {
    #[inline]
    pub fn check(index: &FlatIndex, corpus: &CorpusStore) -> Self {
        let index_vectors = index.len();
        let corpus_chunks = corpus.len();
        let digest_matches = corpus.index_digest == index.digest();
        let is_consistent = index_vectors > 0
            && index_vectors == corpus_chunks
            && index.dimension() == corpus.dimension
            && digest_matches;

        Self {
            index_vectors,
            index_dimension: index.dimension(),
            corpus_chunks,
            corpus_dimension: corpus.dimension,
            digest_matches,
            is_consistent,
        }
    }

    /// Human readable description of the first problem found
    #[inline]
    pub fn summary(&self) -> String {
        if self.is_consistent {
            format!(
                "{} vectors of {} dimensions aligned with {} chunks",
                self.index_vectors, self.index_dimension, self.corpus_chunks
            )
        } else if self.index_vectors == 0 || self.corpus_chunks == 0 {
            format!(
                "snapshot is empty ({} vectors, {} chunks)",
                self.index_vectors, self.corpus_chunks
            )
        } else if self.index_vectors != self.corpus_chunks {
            format!(
                "index has {} vectors but the corpus has {} chunks",
                self.index_vectors, self.corpus_chunks
            )
        } else if self.index_dimension != self.corpus_dimension {
            format!(
                "index has {} dimensions but the corpus records {}",
                self.index_dimension, self.corpus_dimension
            )
        } else {
            "index and corpus come from different builds".to_string()
        }
    }
}

/// A vector index and its corpus, persisted and loaded as one unit
#[derive(Debug, Clone)]
pub struct Snapshot {
    index: FlatIndex,
    corpus: CorpusStore,
}

impl Snapshot {
    /// Pair a freshly built index with its corpus, rejecting misaligned pairs
    ///
    /// The corpus is stamped with the index digest so that the pair can be
    /// recognised when loaded.
    #[inline]
    pub fn new(index: FlatIndex, mut corpus: CorpusStore) -> Result<Self> {
        corpus.index_digest = index.digest();
        let report = ConsistencyReport::check(&index, &corpus);
        if !report.is_consistent {
            return Err(RagError::CorruptSnapshot(report.summary()));
        }
        Ok(Self { index, corpus })
    }

    #[inline]
    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    #[inline]
    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    #[inline]
    pub fn summarize(&self) -> CorpusSummary {
        self.corpus.summarize()
    }

    /// Write both files, replacing any previous snapshot in `dir`
    ///
    /// Each file is written under a temporary name first and renamed into
    /// place, the corpus last.
    #[inline]
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;

        let index_path = dir.join(INDEX_FILE);
        let chunks_path = dir.join(CHUNKS_FILE);
        let index_tmp = temporary_path(&index_path);
        let chunks_tmp = temporary_path(&chunks_path);

        let written = self
            .index
            .save(&index_tmp)
            .and_then(|()| self.corpus.save(&chunks_tmp))
            .and_then(|()| fs::rename(&index_tmp, &index_path).map_err(RagError::from))
            .and_then(|()| fs::rename(&chunks_tmp, &chunks_path).map_err(RagError::from));
        if let Err(e) = written {
            for tmp in [&index_tmp, &chunks_tmp] {
                if tmp.is_file() {
                    if let Err(remove_error) = fs::remove_file(tmp) {
                        warn!("Failed to remove {}: {}", tmp.display(), remove_error);
                    }
                }
            }
            return Err(e);
        }

        info!(
            "Saved snapshot with {} chunks to {}",
            self.len(),
            dir.display()
        );
        Ok(())
    }

    #[inline]
    pub fn load(dir: &Path) -> Result<Self> {
        let index_path = dir.join(INDEX_FILE);
        let chunks_path = dir.join(CHUNKS_FILE);
        for path in [&index_path, &chunks_path] {
            if !path.is_file() {
                return Err(RagError::MissingSnapshot { path: path.clone() });
            }
        }

        let index = FlatIndex::load(&index_path)?;
        let corpus = CorpusStore::load(&chunks_path)?;
        let report = ConsistencyReport::check(&index, &corpus);
        if !report.is_consistent {
            warn!("Snapshot at {} failed integrity checks", dir.display());
            return Err(RagError::CorruptSnapshot(report.summary()));
        }

        debug!("Loaded snapshot: {}", report.summary());
        Ok(Self { index, corpus })
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
