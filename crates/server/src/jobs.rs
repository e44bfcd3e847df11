//! In-memory tracking of background ingestion jobs.
//!
//! Jobs are kept in insertion order. Once more than `max_retained` are held,
//! the oldest finished jobs are evicted; jobs still pending or processing are
//! never dropped.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use documind_ingest::ContentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Done,
    Failed,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

#[derive(Debug)]
struct Progress {
    status: JobStatus,
    chunk_count: Option<usize>,
    error: Option<String>,
    completed_at: Option<DateTime<Utc>>,
}

/// One uploaded document moving through extraction, chunking and indexing.
#[derive(Debug)]
pub struct IngestJob {
    pub id: Uuid,
    pub file_name: String,
    pub kind: ContentKind,
    pub size_bytes: usize,
    pub created_at: DateTime<Utc>,
    progress: RwLock<Progress>,
}

/// Serialized view of a job for the `/jobs` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobView {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: usize,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Option<String>)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl IngestJob {
    pub fn new(file_name: impl Into<String>, kind: ContentKind, size_bytes: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            kind,
            size_bytes,
            created_at: Utc::now(),
            progress: RwLock::new(Progress {
                status: JobStatus::Pending,
                chunk_count: None,
                error: None,
                completed_at: None,
            }),
        }
    }

    fn update(&self, f: impl FnOnce(&mut Progress)) {
        let mut progress = self.progress.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut progress);
    }

    pub fn status(&self) -> JobStatus {
        self.progress
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
    }

    pub fn mark_processing(&self) {
        self.update(|p| p.status = JobStatus::Processing);
    }

    pub fn mark_done(&self, chunk_count: usize) {
        self.update(|p| {
            p.status = JobStatus::Done;
            p.chunk_count = Some(chunk_count);
            p.completed_at = Some(Utc::now());
        });
    }

    pub fn mark_failed(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.update(|p| {
            p.status = JobStatus::Failed;
            p.error = Some(reason);
            p.completed_at = Some(Utc::now());
        });
    }

    pub fn view(&self) -> JobView {
        let progress = self.progress.read().unwrap_or_else(PoisonError::into_inner);
        JobView {
            id: self.id,
            file_name: self.file_name.clone(),
            content_type: self.kind.mime().to_string(),
            size_bytes: self.size_bytes,
            status: progress.status,
            chunk_count: progress.chunk_count,
            error: progress.error.clone(),
            created_at: self.created_at,
            completed_at: progress.completed_at,
        }
    }
}

pub struct JobStore {
    jobs: RwLock<IndexMap<Uuid, Arc<IngestJob>>>,
    max_retained: usize,
}

impl JobStore {
    pub fn new(max_retained: usize) -> Self {
        Self {
            jobs: RwLock::new(IndexMap::new()),
            max_retained,
        }
    }

    /// Register a new pending job.
    pub fn create(&self, file_name: &str, kind: ContentKind, size_bytes: usize) -> Arc<IngestJob> {
        let job = Arc::new(IngestJob::new(file_name, kind, size_bytes));
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        jobs.insert(job.id, Arc::clone(&job));

        while jobs.len() > self.max_retained {
            match jobs.values().position(|j| j.status().is_finished()) {
                Some(oldest) => {
                    jobs.shift_remove_index(oldest);
                }
                None => break,
            }
        }
        job
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<IngestJob>> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// All retained jobs, oldest first.
    pub fn list(&self) -> Vec<Arc<IngestJob>> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
