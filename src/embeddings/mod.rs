// Embeddings module
// Chunking of extracted text and the embedding backends that vectorize it

pub mod chunking;
pub mod ollama;

pub use chunking::{Chunk, ChunkingConfig, split};
pub use ollama::OllamaClient;

use crate::Result;

/// Maps text to fixed-length vectors
///
/// Implementations must return one vector per input, in input order, all with
/// the same dimensionality.
pub trait Embedder: Send + Sync {
    /// Identifier recorded alongside a snapshot
    fn model_name(&self) -> &str;

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    #[inline]
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| crate::RagError::Embedding("empty embedding response".to_string()))
    }
}

/// Scale `vector` to unit length in place; zero vectors are left untouched
#[inline]
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
