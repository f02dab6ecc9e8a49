//! In-memory vector store
//!
//! Reference implementation of the full store contract. Similarity search
//! is an exact cosine scan over every entry, suitable for tests and small
//! corpora; the Postgres store is the durable counterpart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::domain::embedding::cosine_similarity;
use crate::domain::store::{SimilarItem, StrategyHit, StrategyStore, VectorStore};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct StoredStrategy {
    path: String,
    content: String,
    embedding: Vec<f32>,
}

/// In-memory store over two RwLock-protected maps: raw text embeddings
/// and named strategy records.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    embeddings: RwLock<HashMap<String, Vec<f32>>>,
    strategies: RwLock<HashMap<String, StoredStrategy>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored raw embeddings.
    pub fn len(&self) -> usize {
        self.embeddings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn get(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        self.embeddings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(text)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("no embedding stored for {:?}", text)))
    }

    async fn store(&self, text: &str, vector: &[f32]) -> Result<(), DomainError> {
        self.embeddings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(text.to_string(), vector.to_vec());
        Ok(())
    }
}

#[async_trait]
impl StrategyStore for InMemoryVectorStore {
    async fn search_by_embedding(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<SimilarItem>, DomainError> {
        let embeddings = self
            .embeddings
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut items: Vec<SimilarItem> = embeddings
            .iter()
            .map(|(text, vector)| {
                let similarity = cosine_similarity(embedding, vector);
                SimilarItem {
                    text: text.clone(),
                    distance: 1.0 - similarity,
                    similarity,
                }
            })
            .collect();

        // Secondary text ordering keeps equal-similarity results stable
        // despite map iteration order.
        items.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.text.cmp(&b.text))
        });
        items.truncate(k);

        Ok(items)
    }

    async fn search_strategies(
        &self,
        embedding: &[f32],
        threshold: f64,
        max_results: usize,
    ) -> Result<Vec<StrategyHit>, DomainError> {
        let strategies = self
            .strategies
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut hits: Vec<StrategyHit> = strategies
            .iter()
            .map(|(name, record)| StrategyHit {
                name: name.clone(),
                path: record.path.clone(),
                content: record.content.clone(),
                similarity: cosine_similarity(embedding, &record.embedding) as f64,
            })
            .filter(|hit| hit.similarity >= threshold)
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        hits.truncate(max_results);

        Ok(hits)
    }

    async fn upsert_strategy(
        &self,
        name: &str,
        path: &str,
        content: &str,
        embedding: &[f32],
    ) -> Result<u64, DomainError> {
        let mut strategies = self
            .strategies
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = strategies.get(name) {
            if existing.content == content && existing.path == path {
                return Ok(0);
            }
        }

        strategies.insert(
            name.to_string(),
            StoredStrategy {
                path: path.to_string(),
                content: content.to_string(),
                embedding: embedding.to_vec(),
            },
        );

        Ok(1)
    }
}
