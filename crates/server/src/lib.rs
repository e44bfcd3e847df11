//! DocuMind HTTP service: document upload, background ingestion and
//! retrieval-augmented question answering over an in-memory index.

pub mod api;
pub mod ingestion;
pub mod jobs;
pub mod rate_limit;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
