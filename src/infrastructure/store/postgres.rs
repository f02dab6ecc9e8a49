//! PostgreSQL + pgvector store

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::store::{SimilarItem, StrategyHit, StrategyStore, VectorStore};
use crate::domain::DomainError;

/// Durable vector store backed by PostgreSQL with the pgvector extension.
///
/// Embeddings are keyed by raw text in the `embeddings` table; strategy
/// records live in `prompt_strategies` keyed by unique name. Both carry
/// an ivfflat cosine index so nearest-neighbor ordering is served by the
/// database. Vectors cross the wire as pgvector text literals bound
/// through `::vector` casts.
#[derive(Debug)]
pub struct PostgresVectorStore {
    pool: PgPool,
    dimension: u32,
}

impl PostgresVectorStore {
    /// Connect and ensure the schema exists. Any failure here is fatal:
    /// a store that cannot reach its database must not be handed out.
    pub async fn connect(database_url: &str, dimension: u32) -> Result<Self, DomainError> {
        tracing::info!(dimension, "Connecting to PostgreSQL vector store");

        let pool = PgPool::connect(database_url).await.map_err(|e| {
            DomainError::configuration(format!("Failed to connect to PostgreSQL: {}", e))
        })?;

        let store = Self::with_pool(pool, dimension);
        store.ensure_schema().await?;

        tracing::info!("PostgreSQL vector store ready");
        Ok(store)
    }

    /// Wrap an existing pool without touching the schema.
    pub fn with_pool(pool: PgPool, dimension: u32) -> Self {
        Self { pool, dimension }
    }

    /// Create the pgvector extension, both tables, and their indexes.
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::configuration(format!("Failed to create vector extension: {}", e))
            })?;

        let embeddings_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS embeddings (
                text TEXT PRIMARY KEY,
                embedding vector({}) NOT NULL
            )
            "#,
            self.dimension
        );
        sqlx::query(&embeddings_table)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::configuration(format!("Failed to create embeddings table: {}", e))
            })?;

        let strategies_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS prompt_strategies (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                path TEXT NOT NULL,
                content TEXT NOT NULL,
                embedding vector({}) NOT NULL
            )
            "#,
            self.dimension
        );
        sqlx::query(&strategies_table)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::configuration(format!(
                    "Failed to create prompt_strategies table: {}",
                    e
                ))
            })?;

        // IVFFlat requires some data to build, so ignore errors
        let _ = sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_embeddings_embedding \
             ON embeddings USING ivfflat (embedding vector_cosine_ops) WITH (lists = 100)",
        )
        .execute(&self.pool)
        .await;

        let _ = sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_prompt_strategies_embedding \
             ON prompt_strategies USING ivfflat (embedding vector_cosine_ops) WITH (lists = 100)",
        )
        .execute(&self.pool)
        .await;

        Ok(())
    }
}

#[async_trait]
impl VectorStore for PostgresVectorStore {
    async fn get(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let row = sqlx::query("SELECT embedding::text AS embedding FROM embeddings WHERE text = $1")
            .bind(text)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Embedding lookup failed: {}", e)))?;

        match row {
            Some(row) => {
                let literal: String = row.get("embedding");
                parse_vector(&literal)
            }
            None => Err(DomainError::not_found(format!(
                "no embedding stored for {:?}",
                text
            ))),
        }
    }

    async fn store(&self, text: &str, vector: &[f32]) -> Result<(), DomainError> {
        tracing::debug!(text, "Storing embedding");

        sqlx::query(
            r#"
            INSERT INTO embeddings (text, embedding)
            VALUES ($1, $2::vector)
            ON CONFLICT (text) DO UPDATE SET embedding = EXCLUDED.embedding
            "#,
        )
        .bind(text)
        .bind(format_vector(vector))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to store embedding: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl StrategyStore for PostgresVectorStore {
    async fn search_by_embedding(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<SimilarItem>, DomainError> {
        tracing::debug!(k, "Searching nearest embeddings");

        let rows = sqlx::query(
            r#"
            SELECT text, embedding <=> $1::vector AS distance
            FROM embeddings
            ORDER BY embedding <=> $1::vector
            LIMIT $2
            "#,
        )
        .bind(format_vector(embedding))
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Embedding search failed: {}", e)))?;

        let items = rows
            .into_iter()
            .map(|row| {
                let text: String = row.get("text");
                let distance: f64 = row.get("distance");
                SimilarItem {
                    text,
                    distance: distance as f32,
                    similarity: (1.0 - distance) as f32,
                }
            })
            .collect();

        Ok(items)
    }

    async fn search_strategies(
        &self,
        embedding: &[f32],
        threshold: f64,
        max_results: usize,
    ) -> Result<Vec<StrategyHit>, DomainError> {
        tracing::debug!(threshold, max_results, "Searching strategies");

        let rows = sqlx::query(
            r#"
            SELECT name, path, content, 1 - (embedding <=> $1::vector) AS similarity
            FROM prompt_strategies
            WHERE 1 - (embedding <=> $1::vector) >= $2
            ORDER BY similarity DESC
            LIMIT $3
            "#,
        )
        .bind(format_vector(embedding))
        .bind(threshold)
        .bind(max_results as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Strategy search failed: {}", e)))?;

        let hits = rows
            .into_iter()
            .map(|row| StrategyHit {
                name: row.get("name"),
                path: row.get("path"),
                content: row.get("content"),
                similarity: row.get("similarity"),
            })
            .collect();

        Ok(hits)
    }

    async fn upsert_strategy(
        &self,
        name: &str,
        path: &str,
        content: &str,
        embedding: &[f32],
    ) -> Result<u64, DomainError> {
        tracing::debug!(name, "Upserting strategy");

        // Change detection happens in the statement itself; only a real
        // content or path change counts as an affected row.
        let result = sqlx::query(
            r#"
            INSERT INTO prompt_strategies (name, path, content, embedding)
            VALUES ($1, $2, $3, $4::vector)
            ON CONFLICT (name) DO UPDATE SET
                path = EXCLUDED.path,
                content = EXCLUDED.content,
                embedding = EXCLUDED.embedding
            WHERE prompt_strategies.content IS DISTINCT FROM EXCLUDED.content
               OR prompt_strategies.path IS DISTINCT FROM EXCLUDED.path
            "#,
        )
        .bind(name)
        .bind(path)
        .bind(content)
        .bind(format_vector(embedding))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to upsert strategy {:?}: {}", name, e)))?;

        let affected = result.rows_affected();
        if affected == 0 {
            tracing::debug!(name, "Strategy unchanged, upsert skipped");
        }

        Ok(affected)
    }
}

/// Format a vector as a pgvector literal `[x1,x2,...]`.
fn format_vector(vector: &[f32]) -> String {
    let parts: Vec<String> = vector.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(","))
}

/// Parse a pgvector literal back into a vector.
fn parse_vector(literal: &str) -> Result<Vec<f32>, DomainError> {
    let inner = literal.trim().trim_start_matches('[').trim_end_matches(']');
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .map_err(|e| DomainError::storage(format!("Invalid vector literal: {}", e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_vector() {
        assert_eq!(format_vector(&[1.0, -0.5, 0.25]), "[1,-0.5,0.25]");
        assert_eq!(format_vector(&[]), "[]");
    }

    #[test]
    fn test_parse_vector() {
        assert_eq!(parse_vector("[1,-0.5,0.25]").unwrap(), vec![1.0, -0.5, 0.25]);
        assert_eq!(parse_vector("[]").unwrap(), Vec::<f32>::new());
        assert_eq!(
            parse_vector(" [0.1, 0.2] ").unwrap(),
            vec![0.1, 0.2]
        );
    }

    #[test]
    fn test_parse_vector_rejects_garbage() {
        assert!(parse_vector("[1,abc]").is_err());
    }

    #[test]
    fn test_format_parse_round_trip() {
        let vector = vec![0.125, -3.5, 42.0, 0.0];

        assert_eq!(parse_vector(&format_vector(&vector)).unwrap(), vector);
    }
}
