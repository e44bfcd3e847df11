//! Router-level tests: requests go through the full middleware stack via
//! `tower::ServiceExt::oneshot`, with the hashing embedder and a scripted LLM.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use documind_core::Config;
use documind_ingest::{Embedder, HashingEmbedder};
use documind_llm::{AnswerGenerator, LlmError, LlmProvider, Message};
use documind_server::{build_router, AppState};

const BOUNDARY: &str = "documind-test-boundary";

// ── Scripted LLM providers ───────────────────────────────────────

/// Answers with a fixed reply and keeps every prompt it was sent.
#[derive(Clone, Default)]
struct Scripted {
    prompts: Arc<Mutex<Vec<Vec<Message>>>>,
}

#[async_trait]
impl LlmProvider for Scripted {
    async fn complete(&self, messages: Vec<Message>, _: f32, _: u32) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(messages);
        Ok("The sky is blue.".to_string())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct Stalled;

#[async_trait]
impl LlmProvider for Stalled {
    async fn complete(&self, _: Vec<Message>, _: f32, _: u32) -> Result<String, LlmError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(String::new())
    }

    fn name(&self) -> &str {
        "stalled"
    }
}

struct Failing;

#[async_trait]
impl LlmProvider for Failing {
    async fn complete(&self, _: Vec<Message>, _: f32, _: u32) -> Result<String, LlmError> {
        Err(LlmError::ApiError { status: 503, body: "model loading".into() })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn test_config() -> Config {
    let mut config = Config::default();
    config.llm.hf_token = Some("hf_test".to_string());
    config.embedding.provider = "hash".to_string();
    config.retrieval.chunk_size = 20;
    config.retrieval.chunk_overlap = 5;
    config
}

fn app_with(provider: Box<dyn LlmProvider>, timeout: Duration) -> (Router, Arc<AppState>) {
    app_with_config(test_config(), provider, timeout)
}

fn app_with_config(
    config: Config,
    provider: Box<dyn LlmProvider>,
    timeout: Duration,
) -> (Router, Arc<AppState>) {
    config.validate().unwrap();
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(config.embedding.dimensions));
    let generator = AnswerGenerator::new(provider, 0.1, 500, timeout, 4);
    let state = Arc::new(AppState::new(config, embedder, generator).unwrap());
    (build_router(Arc::clone(&state)), state)
}

fn app() -> (Router, Arc<AppState>, Scripted) {
    let provider = Scripted::default();
    let (router, state) = app_with(Box::new(provider.clone()), Duration::from_secs(5));
    (router, state, provider)
}

fn peer(last_octet: u8) -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::from(([10, 0, 0, last_octet], 40000)))
}

fn upload_request(file_name: &str, content_type: &str, body: &[u8], from: u8) -> Request<Body> {
    upload_field_request("file", file_name, content_type, body, from)
}

fn upload_field_request(
    field: &str,
    file_name: &str,
    content_type: &str,
    body: &[u8],
    from: u8,
) -> Request<Body> {
    let mut payload = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    payload.extend_from_slice(body);
    payload.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .extension(peer(from))
        .body(Body::from(payload))
        .unwrap()
}

fn query_request(question: &str, from: u8) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .extension(peer(from))
        .body(Body::from(json!({ "question": question }).to_string()))
        .unwrap()
}

fn raw_query_request(body: &str, from: u8) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .extension(peer(from))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn wait_for_job(app: &Router, id: &str) -> Value {
    for _ in 0..500 {
        let (status, job) = send(app, get(&format!("/jobs/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        if job["status"] == "done" || job["status"] == "failed" {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} did not finish");
}

async fn seed(state: &AppState, texts: &[&str]) {
    let vectors = state.embedder.embed_batch(texts).await.unwrap();
    let chunks = texts.iter().map(|t| t.to_string()).zip(vectors).collect();
    state.store.add_document(Uuid::new_v4(), "seed.txt", chunks).unwrap();
}

// ── Tests ────────────────────────────────────────────────────────

#[tokio::test]
async fn query_on_empty_index_is_400() {
    let (app, _, provider) = app();
    let (status, body) = send(&app, query_request("What color is the sky?", 1)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data indexed.");
    assert!(provider.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unsupported_type_is_rejected_without_creating_a_job() {
    let (app, state, _) = app();
    let (status, body) = send(&app, upload_request("photo.png", "image/png", b"\x89PNG", 1)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported file type.");
    assert!(state.jobs.is_empty());
}

#[tokio::test]
async fn missing_file_field_is_400() {
    let (app, state, _) = app();
    let req = upload_field_request("attachment", "notes.txt", "text/plain", b"hello", 1);
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(state.jobs.is_empty());
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    let (app, state, provider) = app();
    seed(&state, &["The sky is blue."]).await;

    let (status, body) = send(&app, raw_query_request("{}", 1)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("question"), "body: {body}");

    let (status, body) = send(&app, raw_query_request("not json", 2)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some(), "body: {body}");

    let (status, body) = send(&app, get("/jobs/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some(), "body: {body}");

    let req = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "text/plain")
        .extension(peer(3))
        .body(Body::from("hello"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some(), "body: {body}");
    assert!(state.jobs.is_empty());

    assert!(provider.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn pdf_upload_is_indexed() {
    let (app, state, _) = app();
    let pdf = include_bytes!("../../ingest/tests/fixtures/two_pages.pdf");
    let (status, body) = send(&app, upload_request("pages.pdf", "application/pdf", pdf, 1)).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let job = wait_for_job(&app, body["job_id"].as_str().unwrap()).await;
    assert_eq!(job["status"], "done", "job failed: {job}");
    assert_eq!(job["content_type"], "application/pdf");
    assert!(job["chunk_count"].as_u64().unwrap() >= 1);
    assert_eq!(state.store.stats().documents, 1);
}

#[tokio::test]
async fn zero_cache_size_queries_the_embedder_directly() {
    let mut config = test_config();
    config.embedding.cache_size = 0;
    let (_, state) = app_with_config(config, Box::new(Scripted::default()), Duration::from_secs(5));
    assert!(Arc::ptr_eq(&state.embedder, &state.query_embedder));

    let (_, state, _) = app();
    assert!(!Arc::ptr_eq(&state.embedder, &state.query_embedder));
}

#[tokio::test]
async fn sixth_upload_in_a_minute_is_rate_limited() {
    let (app, _, _) = app();
    for _ in 0..5 {
        let (status, body) = send(&app, upload_request("a.txt", "text/plain", b"hello world", 7)).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["status"], "Processing");
    }

    let response = app
        .clone()
        .oneshot(upload_request("a.txt", "text/plain", b"hello world", 7))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));

    // Another client has its own window.
    let (status, _) = send(&app, upload_request("a.txt", "text/plain", b"hello world", 8)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn eleventh_query_in_a_minute_is_rate_limited() {
    let (app, _, _) = app();
    for _ in 0..10 {
        let (status, _) = send(&app, query_request("anything?", 3)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    let (status, body) = send(&app, query_request("anything?", 3)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().unwrap().contains("Rate limit exceeded"));
}

#[tokio::test]
async fn upload_then_query_answers_from_the_document() {
    let (app, state, provider) = app();

    let (status, body) = send(
        &app,
        upload_request("sky.txt", "text/plain", b"The sky is blue. Grass is green.", 1),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = body["job_id"].as_str().unwrap().to_string();

    let job = wait_for_job(&app, &job_id).await;
    assert_eq!(job["status"], "done", "job failed: {job}");
    assert_eq!(job["chunk_count"], 3);
    assert_eq!(job["file_name"], "sky.txt");

    let stats = state.store.stats();
    assert_eq!(stats.vectors, 3);
    assert_eq!(state.store.positions(), vec![0, 1, 2]);

    let (status, body) = send(&app, query_request("What color is the sky?", 1)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["answer"].as_str().unwrap().is_empty());
    let sources = body["sources"].as_str().unwrap();
    assert!(sources.starts_with("The sky is blue. Gra"), "sources: {sources}");
    assert!(sources.ends_with("..."));

    let prompts = provider.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].len(), 2);
    assert!(prompts[0][1]
        .content
        .starts_with("Context: The sky is blue. Gra\n"));
    assert!(prompts[0][1].content.ends_with("\n\nQuestion: What color is the sky?"));
}

#[tokio::test]
async fn undecodable_text_fails_the_job() {
    let (app, state, _) = app();
    let (status, body) =
        send(&app, upload_request("bad.txt", "text/plain", &[0xff, 0xfe, 0x41], 1)).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let job = wait_for_job(&app, body["job_id"].as_str().unwrap()).await;
    assert_eq!(job["status"], "failed");
    assert!(job["error"].as_str().unwrap().contains("UTF-8"));
    assert!(state.store.is_empty());
}

#[tokio::test]
async fn blank_document_fails_the_job() {
    let (app, state, _) = app();
    let (_, body) = send(&app, upload_request("blank.txt", "text/plain", b"  \n\t ", 1)).await;

    let job = wait_for_job(&app, body["job_id"].as_str().unwrap()).await;
    assert_eq!(job["status"], "failed");
    assert_eq!(job["error"], "Document contains no extractable text");
    assert!(state.store.is_empty());
}

#[tokio::test]
async fn jobs_are_listed_and_unknown_ids_are_404() {
    let (app, _, _) = app();
    let (_, body) = send(&app, upload_request("a.txt", "text/plain", b"alpha beta", 1)).await;
    let id = body["job_id"].as_str().unwrap().to_string();
    wait_for_job(&app, &id).await;

    let (status, jobs) = send(&app, get("/jobs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs.as_array().unwrap().len(), 1);
    assert_eq!(jobs[0]["id"], id.as_str());

    let (status, body) = send(&app, get(&format!("/jobs/{}", Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn llm_timeout_is_504() {
    let (app, state) = app_with(Box::new(Stalled), Duration::from_millis(50));
    seed(&state, &["The sky is blue."]).await;

    let (status, body) = send(&app, query_request("What color is the sky?", 1)).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn llm_failure_is_502() {
    let (app, state) = app_with(Box::new(Failing), Duration::from_secs(5));
    seed(&state, &["The sky is blue."]).await;

    let (status, body) = send(&app, query_request("What color is the sky?", 1)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn health_reports_index_size() {
    let (app, state, _) = app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["indexed_chunks"], 0);
    assert_eq!(body["dimensions"], 384);

    seed(&state, &["one", "two"]).await;
    let (_, body) = send(&app, get("/health")).await;
    assert_eq!(body["indexed_chunks"], 2);
    assert_eq!(body["documents"], 1);
}

#[tokio::test]
async fn serves_chat_ui() {
    let (app, _, _) = app();
    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("<title>DocuMind AI</title>"));
}
