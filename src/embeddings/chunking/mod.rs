#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::DocumentBlob;
use crate::{RagError, Result};

/// A window of document text, the unit that gets embedded and retrieved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Window contents
    pub text: String,
    /// File name of the originating document
    pub source: String,
    /// Format tag of the originating document, e.g. ".pdf"
    pub format: String,
    /// Global ordinal assigned in emission order
    pub chunk_id: usize,
}

/// Configuration for fixed-window chunking
///
/// Sizes are measured in characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window length
    pub chunk_size: usize,
    /// Characters shared between consecutive windows
    pub overlap: usize,
    /// Windows with this many characters or fewer are dropped.
    /// Defaults to a tenth of `chunk_size` when unset.
    pub min_chunk_chars: Option<usize>,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
            min_chunk_chars: None,
        }
    }
}

impl ChunkingConfig {
    #[inline]
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
            min_chunk_chars: None,
        }
    }

    /// Distance between the starts of consecutive windows
    #[inline]
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap)
    }

    #[inline]
    pub fn discard_threshold(&self) -> usize {
        self.min_chunk_chars.unwrap_or(self.chunk_size / 10)
    }

    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::Config(
                "chunk size must be greater than 0".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Split documents into overlapping windows
///
/// `chunk_id` counts across the whole output so that position in the returned
/// vector and `chunk_id` always agree.
#[inline]
pub fn split(documents: &[DocumentBlob], config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;

    let threshold = config.discard_threshold();
    let mut chunks = Vec::new();

    for document in documents {
        let before = chunks.len();
        for window in windows(&document.text, config) {
            if window.chars().count() <= threshold {
                continue;
            }
            chunks.push(Chunk {
                text: window.to_string(),
                source: document.filename.clone(),
                format: document.format.clone(),
                chunk_id: chunks.len(),
            });
        }
        debug!(
            "Split '{}' into {} chunks",
            document.filename,
            chunks.len() - before
        );
    }

    Ok(chunks)
}

/// Raw windows over `text` before the minimum-length filter.
///
/// Starts advance by `step` while the window still reaches past the previous
/// window's overlap, giving `ceil(max(len - overlap, 0) / step)` windows.
/// Callers must pass a validated config.
#[inline]
pub fn windows<'a>(text: &'a str, config: &ChunkingConfig) -> Vec<&'a str> {
    let step = config.step();
    if step == 0 {
        return Vec::new();
    }

    // Byte offset of every char plus the end of the string
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    let mut windows = Vec::new();
    let mut start = 0;
    while start + config.overlap < char_len {
        let end = (start + config.chunk_size).min(char_len);
        if let Some(window) = text.get(boundaries[start]..boundaries[end]) {
            windows.push(window);
        }
        start += step;
    }
    windows
}
