//! In-memory vector index for retrieval.
//!
//! [`FlatL2Index`] does exact brute-force Euclidean search, [`DocumentMap`]
//! resolves vector positions back to chunk text, and [`VectorStore`] owns
//! both behind a single lock so they can never drift apart.

pub mod doc_map;
pub mod error;
pub mod flat;
pub mod store;

pub use doc_map::{ChunkRecord, DocumentMap};
pub use error::IndexError;
pub use flat::{FlatL2Index, Neighbor};
pub use store::{RetrievedChunk, StoreStats, VectorStore};
