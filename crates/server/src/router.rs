//! HTTP router construction.
//!
//! Assembles all Axum routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::state::AppState;
use crate::{api, rate_limit};

/// Build the complete application router with all routes and middleware.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// rate limiters can key on the client address.
pub fn build_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config.limits.max_upload_bytes;
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/", get(api::index))
        .route(
            "/upload",
            post(api::upload)
                .layer(DefaultBodyLimit::max(max_upload_bytes))
                .layer(middleware::from_fn_with_state(
                    Arc::clone(&state),
                    rate_limit::limit_uploads,
                )),
        )
        .route(
            "/query",
            post(api::query).layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                rate_limit::limit_queries,
            )),
        )
        .route("/jobs", get(api::list_jobs))
        .route("/jobs/{id}", get(api::get_job))
        .route("/health", get(api::health))
        .layer(cors)
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!("Invalid CORS_ORIGIN '{}', cross-origin requests will be refused", origin);
            CorsLayer::new()
        }
    }
}
