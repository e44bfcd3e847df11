//! Index and document map owned together behind one lock.
//!
//! A document's vectors and chunk records are inserted under a single write
//! guard, so readers observe either the whole document or none of it. Uses
//! `std::sync::RwLock` since no guard is ever held across an `.await`, and
//! searches run on rayon threads as well as tokio workers.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::doc_map::{ChunkRecord, DocumentMap};
use crate::error::IndexError;
use crate::flat::FlatL2Index;

/// A search hit resolved to its chunk.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    pub position: usize,
    pub distance: f32,
    pub record: ChunkRecord,
}

/// Point-in-time counters for the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub vectors: usize,
    pub documents: usize,
    pub dimensions: usize,
}

struct Inner {
    index: FlatL2Index,
    map: DocumentMap,
    documents: HashSet<Uuid>,
}

pub struct VectorStore {
    inner: RwLock<Inner>,
}

impl VectorStore {
    pub fn new(dimensions: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                index: FlatL2Index::new(dimensions),
                map: DocumentMap::new(),
                documents: HashSet::new(),
            }),
        }
    }

    // Poison is ignored: vectors are validated before the first mutation.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append every chunk of one document. Nothing is inserted unless all
    /// vectors match the index width. Returns the positions assigned.
    pub fn add_document(
        &self,
        document_id: Uuid,
        file_name: &str,
        chunks: Vec<(String, Vec<f32>)>,
    ) -> Result<Range<usize>, IndexError> {
        let mut inner = self.write();
        for (_, vector) in &chunks {
            inner.index.check(vector)?;
        }

        let start = inner.index.len();
        let count = chunks.len();
        for (chunk_index, (text, vector)) in chunks.into_iter().enumerate() {
            let position = inner.index.add(&vector)?;
            let mapped = inner.map.push(ChunkRecord {
                text,
                document_id,
                file_name: file_name.to_string(),
                chunk_index,
            });
            debug_assert_eq!(position, mapped);
        }
        if count > 0 {
            inner.documents.insert(document_id);
        }

        debug!(%document_id, chunks = count, total = inner.index.len(), "Document indexed");
        Ok(start..start + count)
    }

    /// The `k` nearest chunks to `query`, nearest first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>, IndexError> {
        let inner = self.read();
        inner
            .index
            .search(query, k)?
            .into_iter()
            .map(|n| {
                let record = inner
                    .map
                    .get(n.position)
                    .cloned()
                    .ok_or(IndexError::MissingChunk(n.position))?;
                Ok(RetrievedChunk {
                    position: n.position,
                    distance: n.distance,
                    record,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().index.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.read().index.dimensions()
    }

    pub fn stats(&self) -> StoreStats {
        let inner = self.read();
        StoreStats {
            vectors: inner.index.len(),
            documents: inner.documents.len(),
            dimensions: inner.index.dimensions(),
        }
    }

    /// Positions recorded in the document map, ascending.
    pub fn positions(&self) -> Vec<usize> {
        self.read().map.keys().collect()
    }
}
