use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use lru::LruCache;

use super::traits::{Embedder, EmbeddingError};

/// Embedder wrapper that memoizes vectors by exact input text.
///
/// Used on the query path, where users repeat questions; ingestion goes to
/// the inner embedder directly.
pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    cache: Mutex<CacheState>,
}

struct CacheState {
    entries: LruCache<String, Vec<f32>>,
    hits: u64,
    misses: u64,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        // Cached vectors stay valid even if a holder panicked.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn hits(&self) -> u64 {
        self.state().hits
    }

    pub fn misses(&self) -> u64 {
        self.state().misses
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut missing: Vec<&str> = Vec::new();
        {
            let mut state = self.state();
            for text in texts {
                let cached = state.entries.get(*text).cloned();
                if cached.is_some() {
                    state.hits += 1;
                } else {
                    state.misses += 1;
                    missing.push(*text);
                }
                results.push(cached);
            }
        }

        if !missing.is_empty() {
            let fresh = self.inner.embed_batch(&missing).await?;
            if fresh.len() != missing.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: missing.len(),
                    actual: fresh.len(),
                });
            }

            let mut state = self.state();
            let mut fresh = fresh.into_iter();
            for (slot, text) in results.iter_mut().zip(texts) {
                if slot.is_none() {
                    if let Some(vector) = fresh.next() {
                        state.entries.put(text.to_string(), vector.clone());
                        *slot = Some(vector);
                    }
                }
            }
        }

        Ok(results.into_iter().flatten().collect())
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        calls: AtomicUsize,
        texts: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.texts.fetch_add(texts.len(), Ordering::SeqCst);
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn counting() -> Arc<CountingEmbedder> {
        Arc::new(CountingEmbedder {
            calls: AtomicUsize::new(0),
            texts: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn cache_hit_and_miss() {
        let inner = counting();
        let cached = CachedEmbedder::new(inner.clone(), 100);

        let first = cached.embed("hello").await.unwrap();
        assert_eq!(cached.misses(), 1);
        assert_eq!(cached.hits(), 0);

        let second = cached.embed("hello").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.hits(), 1);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn only_misses_reach_inner() {
        let inner = counting();
        let cached = CachedEmbedder::new(inner.clone(), 100);
        cached.embed("bb").await.unwrap();

        let out = cached.embed_batch(&["a", "bb", "ccc"]).await.unwrap();
        assert_eq!(out, vec![vec![1.0, 1.0], vec![2.0, 1.0], vec![3.0, 1.0]]);
        assert_eq!(inner.texts.load(Ordering::SeqCst), 3);
        assert_eq!(cached.len(), 3);
    }

    #[tokio::test]
    async fn cache_eviction() {
        let inner = counting();
        let cached = CachedEmbedder::new(inner.clone(), 2);

        cached.embed("a").await.unwrap();
        cached.embed("b").await.unwrap();
        cached.embed("c").await.unwrap(); // evicts "a"
        assert_eq!(cached.len(), 2);

        cached.embed("a").await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 4);
    }
}
