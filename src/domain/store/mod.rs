//! Vector persistence abstractions
//!
//! `VectorStore` is the baseline capability every backend provides.
//! `StrategyStore` is the advanced capability set; whether a backend
//! supports it is decided once at construction time by which trait object
//! the caller holds, never by downcasting a generic handle mid-operation.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// A result from nearest-neighbor search over raw embeddings.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarItem {
    pub text: String,
    pub distance: f32,
    pub similarity: f32,
}

/// A strategy record returned by server-side similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyHit {
    pub name: String,
    pub path: String,
    pub content: String,
    pub similarity: f64,
}

/// Baseline persistence contract: exact point lookup and upsert by text.
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Retrieve the embedding stored for the given text. Absence is the
    /// distinguishable `DomainError::NotFound` condition.
    async fn get(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Store an embedding for the given text, inserting or overwriting.
    async fn store(&self, text: &str, vector: &[f32]) -> Result<(), DomainError>;
}

/// Advanced capability set: nearest-neighbor search and strategy upsert.
#[async_trait]
pub trait StrategyStore: VectorStore {
    /// Find the `k` nearest stored embeddings, ordered by ascending
    /// distance (descending similarity).
    async fn search_by_embedding(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<SimilarItem>, DomainError>;

    /// Search strategy records by similarity, restricted server-side to
    /// `similarity >= threshold`, ordered descending, capped at
    /// `max_results`.
    async fn search_strategies(
        &self,
        embedding: &[f32],
        threshold: f64,
        max_results: usize,
    ) -> Result<Vec<StrategyHit>, DomainError>;

    /// Insert or update a strategy record, writing only when `content` or
    /// `path` differs from the stored value. Returns the number of rows
    /// affected: 0 for a no-op re-seed, 1 for an actual write.
    async fn upsert_strategy(
        &self,
        name: &str,
        path: &str,
        content: &str,
        embedding: &[f32],
    ) -> Result<u64, DomainError>;
}
