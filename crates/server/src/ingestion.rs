//! Background document ingestion.
//!
//! [`spawn_ingestion`] returns immediately; the job is driven to `done` or
//! `failed` in a tokio task. At most `INGEST_CONCURRENCY` jobs run at once,
//! the rest wait as `pending`.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use documind_index::IndexError;
use documind_ingest::{chunk_text, extract_text, EmbeddingError, ExtractionError};

use crate::jobs::IngestJob;
use crate::state::AppState;

/// Chunks per embedder call.
pub const EMBED_BATCH_SIZE: usize = 64;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("Document contains no extractable text")]
    NoText,
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("Indexing failed: {0}")]
    Index(#[from] IndexError),
    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Ingestion is shutting down")]
    Closed,
}

/// Run ingestion for `job` in the background.
pub fn spawn_ingestion(state: Arc<AppState>, job: Arc<IngestJob>, bytes: Bytes) -> JoinHandle<()> {
    tokio::spawn(async move {
        run(&state, &job, bytes).await;
    })
}

async fn run(state: &AppState, job: &IngestJob, bytes: Bytes) {
    let start = Instant::now();
    let result = match Arc::clone(&state.ingest_permits).acquire_owned().await {
        Ok(_permit) => {
            job.mark_processing();
            ingest(state, job, bytes).await
        }
        Err(_) => Err(IngestError::Closed),
    };
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(chunks) => {
            job.mark_done(chunks);
            info!(
                job_id = %job.id,
                file = %job.file_name,
                chunks,
                duration_ms,
                "Document ingested"
            );
        }
        Err(e) => {
            job.mark_failed(e.to_string());
            error!(
                job_id = %job.id,
                file = %job.file_name,
                duration_ms,
                error = %e,
                "Ingestion failed"
            );
        }
    }
}

/// Extract, chunk, embed and index one document. Returns the chunk count.
pub async fn ingest(state: &AppState, job: &IngestJob, bytes: Bytes) -> Result<usize, IngestError> {
    let kind = job.kind;
    let text = tokio::task::spawn_blocking(move || extract_text(&bytes, kind)).await??;
    if text.trim().is_empty() {
        return Err(IngestError::NoText);
    }

    let chunks = chunk_text(&text, &state.chunking);
    debug!(
        job_id = %job.id,
        chars = text.chars().count(),
        chunks = chunks.len(),
        "Document chunked"
    );

    let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
    let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(texts.len());
    let batches = texts.len().div_ceil(EMBED_BATCH_SIZE);
    for (i, batch) in texts.chunks(EMBED_BATCH_SIZE).enumerate() {
        debug!(job_id = %job.id, "Embedding batch {}/{} ({} chunks)", i + 1, batches, batch.len());
        vectors.extend(state.embedder.embed_batch(batch).await?);
    }

    let entries: Vec<(String, Vec<f32>)> = chunks
        .into_iter()
        .map(|c| c.content)
        .zip(vectors)
        .collect();
    let positions = state.store.add_document(job.id, &job.file_name, entries)?;
    Ok(positions.len())
}
