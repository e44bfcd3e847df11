//! HTTP endpoint modules.
//!
//! Handlers return [`ApiError`] on failure, rendered as `{"error": "..."}`
//! with a status derived from the underlying error.

pub mod doc;
mod health;
mod jobs;
mod query;
mod ui;
mod upload;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use documind_index::IndexError;
use documind_ingest::EmbeddingError;
use documind_llm::LlmError;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("Search failed: {0}")]
    Index(#[from] IndexError),
    #[error("Answer generation failed: {0}")]
    Llm(#[from] LlmError),
    /// An extractor refused the request before the handler ran.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

macro_rules! impl_from_rejection {
    ($($rejection:ty),*) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    ApiError::Rejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )*
    };
}

impl_from_rejection!(JsonRejection, PathRejection, MultipartRejection);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Embedding(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Index(IndexError::Empty) => StatusCode::BAD_REQUEST,
            ApiError::Index(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Llm(LlmError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Llm(_) => StatusCode::BAD_GATEWAY,
            ApiError::Rejected { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

// ── Re-exports ───────────────────────────────────────────────────

pub use health::{health, HealthResponse};
pub use jobs::{get_job, list_jobs};
pub use query::{query, QueryRequest, QueryResponse};
pub use ui::index;
pub use upload::{upload, UploadAccepted};
