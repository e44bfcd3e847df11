use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use documind_ingest::ContentKind;

use super::{ApiError, ErrorResponse};
use crate::ingestion;
use crate::state::AppState;

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UploadAccepted {
    /// Always `"Processing"`.
    pub status: String,
    #[schema(value_type = String)]
    pub job_id: Uuid,
}

/// Upload a document for indexing
///
/// Accepts multipart/form-data with a `file` field of type `application/pdf`
/// or `text/plain`. Extraction, chunking and embedding happen in the
/// background; poll `/jobs/{id}` for the outcome.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "Documents",
    request_body(content_type = "multipart/form-data", description = "File upload"),
    responses(
        (status = 202, description = "Accepted for background ingestion", body = UploadAccepted),
        (status = 400, description = "Unsupported file type or missing file", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    )
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadAccepted>), ApiError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let kind = field
            .content_type()
            .and_then(ContentKind::from_mime)
            .ok_or_else(|| ApiError::BadRequest("Unsupported file type.".into()))?;
        let file_name = field.file_name().unwrap_or("unnamed").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {e}")))?;

        let job = state.jobs.create(&file_name, kind, bytes.len());
        info!(
            job_id = %job.id,
            file = %file_name,
            content_type = kind.mime(),
            bytes = bytes.len(),
            "Upload accepted"
        );
        ingestion::spawn_ingestion(Arc::clone(&state), Arc::clone(&job), bytes);

        return Ok((
            StatusCode::ACCEPTED,
            Json(UploadAccepted {
                status: "Processing".to_string(),
                job_id: job.id,
            }),
        ));
    }

    Err(ApiError::BadRequest("No file provided".into()))
}
