//! Sliding-window splitting over Unicode scalar values.

use std::iter;

use super::types::{Chunk, ChunkConfig};

/// Split `text` into windows of `config.size()` characters starting at
/// `0, step, 2*step, ...` while the start lies inside the text.
///
/// Produces `ceil(len / step)` chunks; trailing windows may be shorter than
/// `size`. Empty text yields no chunks.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<Chunk> {
    // Byte offset of every char boundary, including the end of the string.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    (0..char_len)
        .step_by(config.step())
        .enumerate()
        .map(|(index, start)| {
            let end = (start + config.size()).min(char_len);
            Chunk {
                index,
                content: text[boundaries[start]..boundaries[end]].to_string(),
                char_offset: start,
            }
        })
        .collect()
}
