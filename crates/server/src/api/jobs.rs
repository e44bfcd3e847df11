use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use super::{ApiError, ErrorResponse};
use crate::jobs::JobView;
use crate::state::AppState;

/// List retained ingestion jobs, oldest first
#[utoipa::path(
    get,
    path = "/jobs",
    tag = "Documents",
    responses(
        (status = 200, description = "Ingestion jobs", body = Vec<JobView>)
    )
)]
pub async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<Vec<JobView>> {
    Json(state.jobs.list().iter().map(|job| job.view()).collect())
}

/// Get one ingestion job
#[utoipa::path(
    get,
    path = "/jobs/{id}",
    tag = "Documents",
    params(("id" = String, Path, description = "Job ID returned by /upload")),
    responses(
        (status = 200, description = "Job status", body = JobView),
        (status = 400, description = "Malformed job ID", body = ErrorResponse),
        (status = 404, description = "Unknown job", body = ErrorResponse)
    )
)]
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<JobView>, ApiError> {
    let Path(id) = id?;
    state
        .jobs
        .get(&id)
        .map(|job| Json(job.view()))
        .ok_or_else(|| ApiError::NotFound(format!("ingestion job not found: {id}")))
}
