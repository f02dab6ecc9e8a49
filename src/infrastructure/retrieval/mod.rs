//! Three-tier embedding resolution

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::store::VectorStore;
use crate::domain::DomainError;
use crate::infrastructure::cache::EmbeddingCache;

/// Resolves text to its embedding through cache, persistent store, and
/// provider, writing back on miss.
///
/// All dependencies are injected at construction; there is no shared
/// global state. The store is optional: without one, resolution is
/// cache-then-provider.
#[derive(Debug)]
pub struct RetrievalService {
    provider: Arc<dyn EmbeddingProvider>,
    store: Option<Arc<dyn VectorStore>>,
    cache: EmbeddingCache,
}

impl RetrievalService {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, store: Option<Arc<dyn VectorStore>>) -> Self {
        Self {
            provider,
            store,
            cache: EmbeddingCache::new(),
        }
    }

    /// Resolve the embedding for the given text.
    ///
    /// Tier order: cache, store, provider. A store "not found" is a
    /// recoverable miss; any other store error is logged and treated as
    /// a miss as well. Provider failure is the only hard error.
    pub async fn get(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        if let Some(cached) = self.cache.get(text) {
            tracing::debug!(text, "Cache hit");
            return Ok(cached);
        }

        if let Some(store) = &self.store {
            match store.get(text).await {
                Ok(vector) => {
                    tracing::debug!(text, "Embedding loaded from store");
                    self.cache.set(text, vector.clone());
                    return Ok(vector);
                }
                Err(error) if error.is_not_found() => {
                    tracing::debug!(text, "No stored embedding");
                }
                Err(error) => {
                    tracing::warn!(text, %error, "Store retrieval failed, falling back to provider");
                }
            }
        }

        let vector = self.provider.generate_embedding(text, None).await?;
        tracing::debug!(text, "Generated embedding via provider");

        self.cache.set(text, vector.clone());

        if let Some(store) = &self.store {
            // Persist failure must not fail a resolution that already
            // succeeded.
            if let Err(error) = store.store(text, &vector).await {
                tracing::warn!(text, %error, "Could not persist embedding");
            }
        }

        Ok(vector)
    }

    /// Resolve embeddings for multiple texts.
    ///
    /// Cache hits are returned directly; the remainder goes through the
    /// provider's bounded batch fan-out. Texts that fail to embed are
    /// logged and absent from the result map.
    pub async fn get_batch(&self, texts: &[String]) -> HashMap<String, Vec<f32>> {
        let mut resolved = HashMap::new();
        let mut uncached = Vec::new();

        for text in texts {
            if let Some(cached) = self.cache.get(text) {
                resolved.insert(text.clone(), cached);
            } else {
                uncached.push(text.clone());
            }
        }

        if uncached.is_empty() {
            return resolved;
        }

        let results = self
            .provider
            .generate_embeddings_batch(&uncached, None)
            .await;

        for (text, result) in uncached.into_iter().zip(results) {
            match result {
                Ok(vector) => {
                    self.cache.set(&text, vector.clone());

                    if let Some(store) = &self.store {
                        if let Err(error) = store.store(&text, &vector).await {
                            tracing::warn!(text, %error, "Could not persist embedding");
                        }
                    }

                    resolved.insert(text, vector);
                }
                Err(error) => {
                    tracing::warn!(text, %error, "Failed to generate embedding");
                }
            }
        }

        resolved
    }

    /// Empty the in-memory cache.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("Embedding cache cleared");
    }

    /// Number of cached embeddings.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
