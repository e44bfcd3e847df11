//! Fixed-size sliding-window chunker.
//!
//! Splits extracted text into overlapping windows of `size` characters,
//! advancing `size - overlap` characters per step. Windows ignore word and
//! sentence boundaries.

mod types;
mod window;

pub use types::{Chunk, ChunkConfig, ChunkError};
pub use window::chunk_text;
