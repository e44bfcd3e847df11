//! Document ingestion: text extraction, chunking and embedding.

pub mod document;
pub mod embedding;

pub use document::chunker::{chunk_text, Chunk, ChunkConfig, ChunkError};
pub use document::{extract_text, ContentKind, ExtractionError};
pub use embedding::{CachedEmbedder, Embedder, EmbeddingError, HashingEmbedder, LocalEmbedder};
