
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{RagError, Result};

/// File signature of a persisted index
pub const INDEX_MAGIC: &[u8; 8] = b"DRAGIDX1";
/// Magic + u64 count + u32 dimension
const HEADER_LEN: usize = 8 + 8 + 4;

/// Exact nearest-neighbor index over squared Euclidean distance
///
/// Position `i` in the index always corresponds to position `i` in the
/// corpus it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    /// Row-major, `len * dimension` values
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build an index from vectors that all share one dimensionality
    #[inline]
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self> {
        let first = vectors
            .first()
            .ok_or_else(|| RagError::EmptyCorpus("no vectors to index".to_string()))?;
        let dimension = first.len();
        if dimension == 0 {
            return Err(RagError::Embedding("vectors have zero dimensions".to_string()));
        }

        let mut data = Vec::with_capacity(vectors.len() * dimension);
        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dimension {
                return Err(RagError::Embedding(format!(
                    "vector {} has {} dimensions, expected {}",
                    position,
                    vector.len(),
                    dimension
                )));
            }
            data.extend_from_slice(vector);
        }

        debug!(
            "Built flat index with {} vectors of {} dimensions",
            vectors.len(),
            dimension
        );
        Ok(Self { dimension, data })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// The `k` nearest positions with their distances, closest first
    ///
    /// Equal distances are ordered by position. `k` larger than the index
    /// returns every position.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(RagError::CorruptSnapshot(format!(
                "query has {} dimensions but the index has {}",
                query.len(),
                self.dimension
            )));
        }

        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension)
            .map(|row| squared_l2(row, query))
            .enumerate()
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, by_distance_then_position);
            scored.truncate(k);
        }
        scored.sort_unstable_by(by_distance_then_position);

        Ok(scored)
    }

    /// Lowercase hex SHA-256 over the serialized form
    ///
    /// Stored in the corpus so that an index and a corpus from different
    /// builds are never paired.
    #[inline]
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_bytes());
        format!("{:x}", hasher.finalize())
    }

    #[inline]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        bytes.extend_from_slice(INDEX_MAGIC);
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        for value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = bytes
            .get(..HEADER_LEN)
            .ok_or_else(|| corrupt("index file is shorter than its header"))?;
        let (magic, rest) = header.split_at(INDEX_MAGIC.len());
        if magic != INDEX_MAGIC {
            return Err(corrupt("index file has an unknown signature"));
        }
        let (count, dimension) = rest.split_at(8);
        let count = u64::from_le_bytes(count.try_into().map_err(|_| corrupt("bad count"))?);
        let dimension =
            u32::from_le_bytes(dimension.try_into().map_err(|_| corrupt("bad dimension"))?);

        let count = usize::try_from(count).map_err(|_| corrupt("vector count overflows"))?;
        let dimension = dimension as usize;
        if count == 0 || dimension == 0 {
            return Err(corrupt("index is empty"));
        }

        let payload = &bytes[HEADER_LEN..];
        let expected = count
            .checked_mul(dimension)
            .and_then(|values| values.checked_mul(4))
            .ok_or_else(|| corrupt("index size overflows"))?;
        if payload.len() != expected {
            return Err(RagError::CorruptSnapshot(format!(
                "index declares {} vectors of {} dimensions ({} bytes) but holds {} bytes",
                count,
                dimension,
                expected,
                payload.len()
            )));
        }

        let data = payload
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        Ok(Self { dimension, data })
    }

    #[inline]
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes())?;
        debug!("Saved {} vectors to {}", self.len(), path.display());
        Ok(())
    }

    #[inline]
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let index = Self::from_bytes(&bytes)?;
        debug!("Loaded {} vectors from {}", index.len(), path.display());
        Ok(index)
    }
}

/// Squared Euclidean distance
#[inline]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

fn by_distance_then_position(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}

fn corrupt(message: &str) -> RagError {
    RagError::CorruptSnapshot(message.to_string())
}
