//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Maximum number of provider calls in flight during batch generation.
/// The batch is processed in windows of this width with a barrier between
/// windows, so no more than `BATCH_WINDOW` calls are outstanding at once.
pub const BATCH_WINDOW: usize = 20;

/// Trait for embedding providers (OpenAI, etc.)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate an embedding for a single text. A `None` model falls back
    /// to the provider's current default model.
    async fn generate_embedding(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> Result<Vec<f32>, DomainError>;

    /// Generate embeddings for multiple texts with bounded concurrency.
    ///
    /// Results are index-aligned with `texts` regardless of completion
    /// order. A failure for one text is isolated to that slot and never
    /// fails the batch.
    async fn generate_embeddings_batch(
        &self,
        texts: &[String],
        model: Option<&str>,
    ) -> Vec<Result<Vec<f32>, DomainError>> {
        let mut results = Vec::with_capacity(texts.len());

        for window in texts.chunks(BATCH_WINDOW) {
            let in_flight = window.iter().map(|text| self.generate_embedding(text, model));
            results.extend(futures::future::join_all(in_flight).await);
        }

        results
    }

    /// Change the default embedding model. Safe to call concurrently with
    /// in-flight generation.
    fn set_default_model(&self, model: &str);

    /// Get the current default model.
    fn default_model(&self) -> String;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
