//! Local sentence embeddings (all-MiniLM-L6-v2) via ONNX Runtime.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::info;

use super::traits::{check_output, Embedder, EmbeddingError};

/// Output width of all-MiniLM-L6-v2.
pub const MINILM_DIMENSIONS: usize = 384;

/// Embedder running all-MiniLM-L6-v2 on the CPU.
///
/// Model files are downloaded into the cache directory on first use; after
/// that, inference makes no network calls. Output is deterministic for a
/// given input and model version.
pub struct LocalEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl LocalEmbedder {
    /// Load the model. Blocking: call before the server starts accepting requests.
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self, EmbeddingError> {
        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let model = TextEmbedding::try_new(options)
            .map_err(|e| EmbeddingError::Model(format!("failed to load all-MiniLM-L6-v2: {e}")))?;
        info!("Local embedding model ready (all-MiniLM-L6-v2, {MINILM_DIMENSIONS} dims)");

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();

        // Inference is CPU-bound; keep it off the async workers.
        let vectors = tokio::task::spawn_blocking(move || {
            let model = model
                .lock()
                .map_err(|_| EmbeddingError::Model("embedding model lock poisoned".to_string()))?;
            model
                .embed(owned, None)
                .map_err(|e| EmbeddingError::Model(e.to_string()))
        })
        .await
        .map_err(|e| EmbeddingError::Model(format!("embedding task failed: {e}")))??;

        check_output(&vectors, texts.len(), MINILM_DIMENSIONS)?;
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        MINILM_DIMENSIONS
    }
}
