//! Embedding-backed retrieval and intent-matching engine
//!
//! Resolves text to embedding vectors through a three-tier pipeline
//! (in-memory cache, persistent vector store, remote provider) and
//! classifies free-text queries against a corpus of named strategies,
//! selecting the best match or a deterministic default when no candidate
//! clears the similarity threshold.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::embedding::EmbeddingProvider;
use domain::store::StrategyStore;
use infrastructure::embedding::{HttpClient, OpenAiEmbeddingProvider};
use infrastructure::matching::MatchingEngine;
use infrastructure::retrieval::RetrievalService;
use infrastructure::store::PostgresVectorStore;
use tracing::info;

/// The wired-up engine: retrieval pipeline, matcher, and the strategy
/// store when one is configured.
pub struct Engine {
    pub retrieval: Arc<RetrievalService>,
    pub matching: MatchingEngine,
    pub strategy_store: Option<Arc<dyn StrategyStore>>,
}

/// Construct the engine from configuration.
///
/// Builds the OpenAI provider, connects the Postgres vector store when a
/// database URL is configured (a connection failure here is fatal), and
/// assembles the retrieval service and matching engine around them.
pub async fn build_engine(config: &AppConfig) -> anyhow::Result<Engine> {
    let provider = create_provider(&config.provider)?;

    let pg_store = match &config.database.url {
        Some(url) => {
            let store =
                PostgresVectorStore::connect(url, config.database.dimension).await?;
            info!("Connected to PostgreSQL vector store");
            Some(Arc::new(store))
        }
        None => None,
    };

    let vector_store = pg_store
        .clone()
        .map(|store| store as Arc<dyn domain::store::VectorStore>);
    let strategy_store = pg_store.map(|store| store as Arc<dyn StrategyStore>);

    let retrieval = Arc::new(RetrievalService::new(provider, vector_store));

    let mut matching = MatchingEngine::new(retrieval.clone());
    if let Some(store) = &strategy_store {
        matching = matching.with_strategy_store(store.clone());
    }

    Ok(Engine {
        retrieval,
        matching,
        strategy_store,
    })
}

fn create_provider(
    config: &config::ProviderConfig,
) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let api_key = if config.api_key.is_empty() {
        std::env::var("OPENAI_API_KEY").unwrap_or_default()
    } else {
        config.api_key.clone()
    };

    let client = HttpClient::new();
    let provider = match &config.base_url {
        Some(base_url) => OpenAiEmbeddingProvider::with_base_url(client, api_key, base_url)?,
        None => OpenAiEmbeddingProvider::new(client, api_key)?,
    };

    if !config.model.is_empty() {
        provider.set_default_model(&config.model);
    }

    Ok(Arc::new(provider))
}
