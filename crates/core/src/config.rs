use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Defaults ──────────────────────────────────────────────────

pub const DEFAULT_HF_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";
pub const DEFAULT_HF_BASE_URL: &str = "https://router.huggingface.co";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
pub const DEFAULT_CHUNK_SIZE: usize = 700;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub limits: LimitsConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `DOCUMIND_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("DOCUMIND_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            embedding: EmbeddingConfig::from_env_profiled(p),
            retrieval: RetrievalConfig::from_env_profiled(p),
            limits: LimitsConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.llm.is_configured() {
            return match self.llm.provider.as_str() {
                "huggingface" | "hf" => Err(ConfigError::Missing("HF_TOKEN")),
                other => Err(ConfigError::Invalid(format!("unknown LLM provider: '{other}'"))),
            };
        }
        match self.embedding.provider.as_str() {
            "local" | "hash" => {}
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unknown embedding provider: '{other}'"
                )))
            }
        }
        if self.embedding.dimensions == 0 {
            return Err(ConfigError::Invalid("EMBEDDING_DIMENSIONS must be > 0".into()));
        }
        if self.retrieval.chunk_size == 0 {
            return Err(ConfigError::Invalid("CHUNK_SIZE must be > 0".into()));
        }
        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            return Err(ConfigError::Invalid(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.retrieval.chunk_overlap, self.retrieval.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::Invalid("RETRIEVAL_TOP_K must be > 0".into()));
        }
        if self.limits.upload_per_window == 0 || self.limits.query_per_window == 0 {
            return Err(ConfigError::Invalid("rate limits must be > 0".into()));
        }
        if self.limits.window_secs == 0 {
            return Err(ConfigError::Invalid("RATE_LIMIT_WINDOW_SECS must be > 0".into()));
        }
        if self.limits.ingest_concurrency == 0 || self.llm.max_concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency limits must be > 0".into()));
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:     {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  llm:        provider={}, model={}, timeout={}s",
            self.llm.provider,
            self.llm.model_label(),
            self.llm.timeout_secs
        );
        tracing::info!(
            "  embedding:  provider={}, dimensions={}",
            self.embedding.provider,
            self.embedding.dimensions
        );
        tracing::info!(
            "  retrieval:  chunk={}/{}, top_k={}",
            self.retrieval.chunk_size,
            self.retrieval.chunk_overlap,
            self.retrieval.top_k
        );
        tracing::info!(
            "  limits:     upload={}/{}s, query={}/{}s",
            self.limits.upload_per_window,
            self.limits.window_secs,
            self.limits.query_per_window,
            self.limits.window_secs
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: String::new(),
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            host: profiled_env_or(p, "HOST", &d.host),
            port: profiled_env_parse(p, "PORT", d.port),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", &d.cors_origin),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origin: "*".to_string(),
        }
    }
}

// ── LLM (Hugging Face / Ollama) ───────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "huggingface", "ollama"
    pub provider: String,
    #[serde(skip_serializing)]
    pub hf_token: Option<String>,
    pub hf_model: String,
    pub hf_base_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_concurrency: usize,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", &d.provider).to_lowercase(),
            hf_token: profiled_env_opt(p, "HF_TOKEN"),
            hf_model: profiled_env_or(p, "HF_MODEL", &d.hf_model),
            hf_base_url: profiled_env_or(p, "HF_BASE_URL", &d.hf_base_url),
            ollama_url: profiled_env_or(p, "OLLAMA_URL", &d.ollama_url),
            ollama_model: profiled_env_or(p, "OLLAMA_MODEL", &d.ollama_model),
            temperature: profiled_env_parse(p, "LLM_TEMPERATURE", d.temperature),
            max_tokens: profiled_env_parse(p, "LLM_MAX_TOKENS", d.max_tokens),
            timeout_secs: profiled_env_parse(p, "LLM_TIMEOUT_SECS", d.timeout_secs),
            max_concurrency: profiled_env_parse(p, "LLM_MAX_CONCURRENCY", d.max_concurrency),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "huggingface" | "hf" => self.hf_token.is_some(),
            "ollama" => true,
            _ => false,
        }
    }

    pub fn model_label(&self) -> &str {
        match self.provider.as_str() {
            "ollama" => &self.ollama_model,
            _ => &self.hf_model,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "huggingface".to_string(),
            hf_token: None,
            hf_model: DEFAULT_HF_MODEL.to_string(),
            hf_base_url: DEFAULT_HF_BASE_URL.to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            temperature: 0.1,
            max_tokens: 500,
            timeout_secs: 60,
            max_concurrency: 4,
        }
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "local" (all-MiniLM-L6-v2 via ONNX) or "hash" (offline feature hashing)
    pub provider: String,
    pub dimensions: usize,
    pub model_cache_dir: Option<PathBuf>,
    /// Capacity of the query-embedding LRU cache (0 disables it).
    pub cache_size: usize,
}

impl EmbeddingConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            provider: profiled_env_or(p, "EMBEDDING_PROVIDER", &d.provider).to_lowercase(),
            dimensions: profiled_env_parse(p, "EMBEDDING_DIMENSIONS", d.dimensions),
            model_cache_dir: profiled_env_opt(p, "EMBEDDING_CACHE_DIR").map(PathBuf::from),
            cache_size: profiled_env_parse(p, "EMBEDDING_CACHE_SIZE", d.cache_size),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            model_cache_dir: None,
            cache_size: 1024,
        }
    }
}

// ── Retrieval ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Characters per chunk.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
    pub top_k: usize,
    /// Characters of joined context echoed back as `sources`.
    pub preview_chars: usize,
}

impl RetrievalConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            chunk_size: profiled_env_parse(p, "CHUNK_SIZE", d.chunk_size),
            chunk_overlap: profiled_env_parse(p, "CHUNK_OVERLAP", d.chunk_overlap),
            top_k: profiled_env_parse(p, "RETRIEVAL_TOP_K", d.top_k),
            preview_chars: profiled_env_parse(p, "SOURCES_PREVIEW_CHARS", d.preview_chars),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: 3,
            preview_chars: 200,
        }
    }
}

// ── Limits ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub upload_per_window: u32,
    pub query_per_window: u32,
    pub window_secs: u64,
    pub max_upload_bytes: usize,
    pub ingest_concurrency: usize,
    pub max_retained_jobs: usize,
}

impl LimitsConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            upload_per_window: profiled_env_parse(p, "UPLOAD_RATE_LIMIT", d.upload_per_window),
            query_per_window: profiled_env_parse(p, "QUERY_RATE_LIMIT", d.query_per_window),
            window_secs: profiled_env_parse(p, "RATE_LIMIT_WINDOW_SECS", d.window_secs),
            max_upload_bytes: profiled_env_parse(p, "MAX_UPLOAD_BYTES", d.max_upload_bytes),
            ingest_concurrency: profiled_env_parse(p, "INGEST_CONCURRENCY", d.ingest_concurrency),
            max_retained_jobs: profiled_env_parse(p, "MAX_RETAINED_JOBS", d.max_retained_jobs),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            upload_per_window: 5,
            query_per_window: 10,
            window_secs: 60,
            max_upload_bytes: 50 * 1024 * 1024,
            ingest_concurrency: 2,
            max_retained_jobs: 256,
        }
    }
}
