// Database module
// Flat vector index, chunk metadata store, and the snapshot that pairs them on disk

pub mod corpus;
pub mod snapshot;
pub mod vector_index;

pub use corpus::{CorpusStore, CorpusSummary, DocumentSummary};
pub use snapshot::{CHUNKS_FILE, ConsistencyReport, INDEX_FILE, Snapshot};
pub use vector_index::{FlatIndex, squared_l2};
