use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use documind_core::Config;
use documind_index::VectorStore;
use documind_ingest::{CachedEmbedder, ChunkConfig, ChunkError, Embedder};
use documind_llm::AnswerGenerator;

use crate::jobs::JobStore;
use crate::rate_limit::RateLimiter;

pub struct AppState {
    pub config: Config,
    pub store: VectorStore,
    /// Embedder for document chunks.
    pub embedder: Arc<dyn Embedder>,
    /// Same model for questions, behind an LRU cache unless its size is 0.
    pub query_embedder: Arc<dyn Embedder>,
    pub generator: AnswerGenerator,
    pub chunking: ChunkConfig,
    pub jobs: JobStore,
    pub ingest_permits: Arc<Semaphore>,
    pub upload_limiter: RateLimiter,
    pub query_limiter: RateLimiter,
}

impl AppState {
    /// Wire up shared state. The index takes its width from the embedder.
    pub fn new(
        config: Config,
        embedder: Arc<dyn Embedder>,
        generator: AnswerGenerator,
    ) -> Result<Self, ChunkError> {
        let chunking = ChunkConfig::new(config.retrieval.chunk_size, config.retrieval.chunk_overlap)?;
        let window = Duration::from_secs(config.limits.window_secs);
        let query_embedder: Arc<dyn Embedder> = match config.embedding.cache_size {
            0 => Arc::clone(&embedder),
            capacity => Arc::new(CachedEmbedder::new(Arc::clone(&embedder), capacity)),
        };

        Ok(Self {
            store: VectorStore::new(embedder.dimensions()),
            embedder,
            query_embedder,
            generator,
            chunking,
            jobs: JobStore::new(config.limits.max_retained_jobs),
            ingest_permits: Arc::new(Semaphore::new(config.limits.ingest_concurrency.max(1))),
            upload_limiter: RateLimiter::new(config.limits.upload_per_window, window),
            query_limiter: RateLimiter::new(config.limits.query_per_window, window),
            config,
        })
    }
}
