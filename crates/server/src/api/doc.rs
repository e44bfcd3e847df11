//! OpenAPI documentation, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DocuMind API",
        version = "0.1.0",
        description = "Upload documents and ask questions answered from their content.",
    ),
    tags(
        (name = "UI", description = "Browser chat interface"),
        (name = "Documents", description = "Document upload and ingestion job status"),
        (name = "Query", description = "Retrieval-augmented question answering"),
        (name = "Health", description = "Server readiness and index size"),
    ),
    paths(
        crate::api::ui::index,
        crate::api::upload::upload,
        crate::api::jobs::list_jobs,
        crate::api::jobs::get_job,
        crate::api::query::query,
        crate::api::health::health,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::upload::UploadAccepted,
        crate::api::query::QueryRequest,
        crate::api::query::QueryResponse,
        crate::api::health::HealthResponse,
        crate::jobs::JobView,
        crate::jobs::JobStatus,
    ))
)]
pub struct ApiDoc;
