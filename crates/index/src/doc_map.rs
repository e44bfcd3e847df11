//! Vector position → source chunk mapping.

use serde::Serialize;
use uuid::Uuid;

/// The chunk a stored vector was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkRecord {
    pub text: String,
    pub document_id: Uuid,
    pub file_name: String,
    /// 0-based index of the chunk within its document.
    pub chunk_index: usize,
}

/// Dense map from vector position to chunk. Keys are always `0..len()`,
/// matching the positions handed out by the index.
#[derive(Debug, Clone, Default)]
pub struct DocumentMap {
    records: Vec<ChunkRecord>,
}

impl DocumentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the chunk for the next position and return that position.
    pub fn push(&mut self, record: ChunkRecord) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    pub fn get(&self, position: usize) -> Option<&ChunkRecord> {
        self.records.get(position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Positions with a recorded chunk, ascending.
    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        0..self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ChunkRecord)> + '_ {
        self.records.iter().enumerate()
    }
}
