//! Chunk configuration and output types.

use documind_core::config::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use thiserror::Error;

// ── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk size must be greater than zero")]
    ZeroSize,
    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
}

/// Configuration for the chunking engine. Lengths are in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    size: usize,
    overlap: usize,
}

impl ChunkConfig {
    /// Validate and build a config. The window must advance by at least one
    /// character per step.
    pub fn new(size: usize, overlap: usize) -> Result<Self, ChunkError> {
        if size == 0 {
            return Err(ChunkError::ZeroSize);
        }
        if overlap >= size {
            return Err(ChunkError::OverlapTooLarge { size, overlap });
        }
        Ok(Self { size, overlap })
    }

    /// Maximum characters per chunk (default: 700).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Characters shared by consecutive chunks (default: 100).
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Window advance per chunk. Always >= 1.
    pub fn step(&self) -> usize {
        self.size - self.overlap
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

// ── Chunk output ────────────────────────────────────────────────────────────

/// A chunk of text with its position in the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based index within the document.
    pub index: usize,
    /// The chunk text content.
    pub content: String,
    /// Character offset in the original document.
    pub char_offset: usize,
}
