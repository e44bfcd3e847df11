use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QueryRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QueryResponse {
    pub answer: String,
    /// Leading characters of the retrieved context, followed by `...`.
    pub sources: String,
}

/// Ask a question about the uploaded documents
///
/// Embeds the question, retrieves the nearest chunks and asks the language
/// model to answer from them alone.
#[utoipa::path(
    post,
    path = "/query",
    tag = "Query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Answer with context preview", body = QueryResponse),
        (status = 400, description = "Nothing indexed yet or malformed body", body = ErrorResponse),
        (status = 422, description = "Body is missing `question`", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Question could not be embedded", body = ErrorResponse),
        (status = 502, description = "Language model call failed", body = ErrorResponse),
        (status = 504, description = "Language model timed out", body = ErrorResponse)
    )
)]
pub async fn query(
    State(state): State<Arc<AppState>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(req) = body?;
    if state.store.is_empty() {
        return Err(ApiError::BadRequest("No data indexed.".into()));
    }

    let start = Instant::now();
    let vector = state.query_embedder.embed(&req.question).await?;
    let hits = state.store.search(&vector, state.config.retrieval.top_k)?;
    let context = hits
        .iter()
        .map(|hit| hit.record.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let answer = state.generator.generate(&context, &req.question).await?;

    info!(
        chunks = hits.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Query answered"
    );
    Ok(Json(QueryResponse {
        answer,
        sources: preview(&context, state.config.retrieval.preview_chars),
    }))
}

/// First `chars` characters of `context` with `...` appended.
fn preview(context: &str, chars: usize) -> String {
    let mut out: String = context.chars().take(chars).collect();
    out.push_str("...");
    out
}
