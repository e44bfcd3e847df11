//! Per-client sliding-window rate limiting for the public endpoints.
//!
//! Each limited route owns one [`RateLimiter`]. Clients are keyed by peer IP
//! (from `ConnectInfo`); requests without one share the `unknown` bucket.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use crate::api::ErrorResponse;
use crate::state::AppState;

/// Above this many tracked clients, idle entries are swept on the next check.
const SWEEP_THRESHOLD: usize = 4096;

pub struct RateLimiter {
    limit: u32,
    window: Duration,
    /// Request timestamps per client within the current window, oldest first.
    clients: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a request from `client`. Returns how long to wait when the
    /// window is already full; rejected requests are not recorded.
    pub fn check(&self, client: &str) -> Result<(), Duration> {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: &str, now: Instant) -> Result<(), Duration> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        if clients.len() > SWEEP_THRESHOLD {
            let window = self.window;
            clients.retain(|_, hits| {
                hits.back()
                    .is_some_and(|t| now.saturating_duration_since(*t) < window)
            });
        }

        let hits = clients.entry(client.to_string()).or_default();
        while hits
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= self.window)
        {
            hits.pop_front();
        }

        if hits.len() < self.limit as usize {
            hits.push_back(now);
            return Ok(());
        }

        let oldest = hits.front().copied().unwrap_or(now);
        Err(self.window.saturating_sub(now.saturating_duration_since(oldest)))
    }
}

/// Middleware for `POST /upload`.
pub async fn limit_uploads(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    enforce(&state.upload_limiter, "upload", req, next).await
}

/// Middleware for `POST /query`.
pub async fn limit_queries(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    enforce(&state.query_limiter, "query", req, next).await
}

async fn enforce(limiter: &RateLimiter, route: &'static str, req: Request, next: Next) -> Response {
    let client = client_key(&req);
    match limiter.check(&client) {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            warn!(client = %client, route, "Rate limit exceeded");
            too_many_requests(limiter, retry_after)
        }
    }
}

fn client_key(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn too_many_requests(limiter: &RateLimiter, retry_after: Duration) -> Response {
    // Whole seconds, rounded up, never zero.
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    let body = ErrorResponse {
        error: format!(
            "Rate limit exceeded: {} per {} second(s)",
            limiter.limit(),
            limiter.window().as_secs()
        ),
    };
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, secs.max(1).to_string())],
        Json(body),
    )
        .into_response()
}
