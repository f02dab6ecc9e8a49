//! Embedding-backed strategy matching

use std::sync::Arc;

use crate::domain::embedding::cosine_similarity;
use crate::domain::matching::{StrategyCorpus, StrategyMatch};
use crate::domain::store::StrategyStore;
use crate::domain::DomainError;
use crate::infrastructure::retrieval::RetrievalService;

/// Matches queries against a strategy corpus using embedding cosine
/// similarity, with an optional store-backed search path.
///
/// The strategy store capability is fixed at construction: callers that
/// want database-side matching build the engine with one, and requesting
/// it without one fails at this boundary instead of deep in a scan.
#[derive(Debug)]
pub struct MatchingEngine {
    retrieval: Arc<RetrievalService>,
    strategy_store: Option<Arc<dyn StrategyStore>>,
}

impl MatchingEngine {
    pub fn new(retrieval: Arc<RetrievalService>) -> Self {
        Self {
            retrieval,
            strategy_store: None,
        }
    }

    /// Enable store-backed matching.
    pub fn with_strategy_store(mut self, store: Arc<dyn StrategyStore>) -> Self {
        self.strategy_store = Some(store);
        self
    }

    /// Find the best-matching strategy by embedding similarity.
    ///
    /// The query embedding must resolve or the call fails; a strategy
    /// whose embedding fails to resolve is skipped. Strategies are scanned
    /// in lexicographic name order with a strict max comparison, so the
    /// first to reach the top score wins ties. Falls back to the default
    /// result when nothing scored or the best score is below `threshold`.
    pub async fn match_best(
        &self,
        query: &str,
        corpus: &StrategyCorpus,
        threshold: f64,
    ) -> Result<StrategyMatch, DomainError> {
        if corpus.is_empty() {
            return Ok(StrategyMatch::default_strategy());
        }

        let query_embedding = self.retrieval.get(query).await?;

        let mut best: Option<StrategyMatch> = None;
        let mut best_score = -1.0;

        for (name, content) in corpus.iter() {
            let embedding = match self.retrieval.get(content).await {
                Ok(embedding) => embedding,
                Err(error) => {
                    tracing::warn!(strategy = %name, %error, "Skipping strategy, embedding failed");
                    continue;
                }
            };

            let score = cosine_similarity(&query_embedding, &embedding) as f64;
            if score > best_score {
                best_score = score;
                best = Some(StrategyMatch {
                    name: name.clone(),
                    path: corpus.path(name).to_string(),
                    score,
                    content: content.clone(),
                });
            }
        }

        match best {
            Some(matched) if matched.score >= threshold => Ok(matched),
            _ => Ok(StrategyMatch::default_strategy()),
        }
    }

    /// Rank strategies by embedding similarity and return the top `n`.
    ///
    /// Strategies whose embeddings fail to resolve are skipped; when none
    /// score at all, the default result is returned alone.
    pub async fn top_n(
        &self,
        query: &str,
        corpus: &StrategyCorpus,
        n: usize,
    ) -> Result<Vec<StrategyMatch>, DomainError> {
        if corpus.is_empty() {
            return Ok(vec![StrategyMatch::default_strategy()]);
        }

        let query_embedding = self.retrieval.get(query).await?;

        let mut matches = Vec::new();
        for (name, content) in corpus.iter() {
            let embedding = match self.retrieval.get(content).await {
                Ok(embedding) => embedding,
                Err(error) => {
                    tracing::warn!(strategy = %name, %error, "Skipping strategy, embedding failed");
                    continue;
                }
            };

            matches.push(StrategyMatch {
                name: name.clone(),
                path: corpus.path(name).to_string(),
                score: cosine_similarity(&query_embedding, &embedding) as f64,
                content: content.clone(),
            });
        }

        if matches.is_empty() {
            return Ok(vec![StrategyMatch::default_strategy()]);
        }

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(n);

        Ok(matches)
    }

    /// Match against the persistent strategy table, pushing the threshold
    /// filter and ordering into the store.
    pub async fn match_best_via_store(
        &self,
        query: &str,
        threshold: f64,
    ) -> Result<StrategyMatch, DomainError> {
        let store = self.strategy_store.as_ref().ok_or_else(|| {
            DomainError::unsupported("store-backed matching requires a strategy store")
        })?;

        let query_embedding = self.retrieval.get(query).await?;

        let hits = store.search_strategies(&query_embedding, threshold, 1).await?;

        Ok(match hits.into_iter().next() {
            Some(hit) => StrategyMatch {
                name: hit.name,
                path: hit.path,
                score: hit.similarity,
                content: hit.content,
            },
            None => StrategyMatch::default_strategy(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::matching::DEFAULT_STRATEGY_NAME;
    use crate::infrastructure::store::InMemoryVectorStore;

    const GO_CONTENT: &str = "goroutines channels concurrency";
    const PYTHON_CONTENT: &str = "indentation duck typing";
    const QUERY: &str = "How do I use goroutines?";

    fn language_corpus() -> StrategyCorpus {
        let mut corpus = StrategyCorpus::new();
        corpus.insert("Go", "strategies/go.md", GO_CONTENT);
        corpus.insert("Python", "strategies/python.md", PYTHON_CONTENT);
        corpus
    }

    fn language_provider() -> MockEmbeddingProvider {
        MockEmbeddingProvider::new(3)
            .with_vector(QUERY, vec![1.0, 0.0, 0.0])
            .with_vector(GO_CONTENT, vec![0.9, 0.1, 0.0])
            .with_vector(PYTHON_CONTENT, vec![0.0, 1.0, 0.0])
    }

    fn engine_with(provider: MockEmbeddingProvider) -> MatchingEngine {
        let retrieval = Arc::new(RetrievalService::new(Arc::new(provider), None));
        MatchingEngine::new(retrieval)
    }

    #[tokio::test]
    async fn test_match_best_picks_closest_strategy() {
        let engine = engine_with(language_provider());

        let result = engine.match_best(QUERY, &language_corpus(), 0.0).await.unwrap();

        assert_eq!(result.name, "Go");
        assert_eq!(result.path, "strategies/go.md");
        assert!(result.score > 0.9);
        assert_eq!(result.content, GO_CONTENT);
    }

    #[tokio::test]
    async fn test_match_best_below_threshold_returns_default() {
        let engine = engine_with(language_provider());

        let result = engine
            .match_best(QUERY, &language_corpus(), 0.999)
            .await
            .unwrap();

        assert_eq!(result.name, DEFAULT_STRATEGY_NAME);
        assert_eq!(result.score, 0.0);
    }

    #[tokio::test]
    async fn test_match_best_empty_corpus_skips_resolution() {
        let provider = Arc::new(MockEmbeddingProvider::new(3));
        let retrieval = Arc::new(RetrievalService::new(provider.clone(), None));
        let engine = MatchingEngine::new(retrieval);

        let result = engine
            .match_best(QUERY, &StrategyCorpus::new(), 0.0)
            .await
            .unwrap();

        assert_eq!(result.name, DEFAULT_STRATEGY_NAME);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_match_best_query_failure_propagates() {
        let provider = MockEmbeddingProvider::new(3).with_error(QUERY, "API down");
        let engine = engine_with(provider);

        let result = engine.match_best(QUERY, &language_corpus(), 0.0).await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_match_best_skips_failing_strategy() {
        let provider = language_provider().with_error(GO_CONTENT, "boom");
        let engine = engine_with(provider);

        let result = engine.match_best(QUERY, &language_corpus(), 0.0).await.unwrap();

        assert_eq!(result.name, "Python");
    }

    #[tokio::test]
    async fn test_match_best_all_strategies_failing_returns_default() {
        let provider = language_provider()
            .with_error(GO_CONTENT, "boom")
            .with_error(PYTHON_CONTENT, "boom");
        let engine = engine_with(provider);

        let result = engine.match_best(QUERY, &language_corpus(), 0.0).await.unwrap();

        assert_eq!(result.name, DEFAULT_STRATEGY_NAME);
    }

    #[tokio::test]
    async fn test_match_best_first_max_wins_ties() {
        let mut corpus = StrategyCorpus::new();
        corpus.insert("Beta", "b.md", "beta content");
        corpus.insert("Alpha", "a.md", "alpha content");

        let provider = MockEmbeddingProvider::new(2)
            .with_vector(QUERY, vec![1.0, 0.0])
            .with_vector("alpha content", vec![1.0, 0.0])
            .with_vector("beta content", vec![1.0, 0.0]);
        let engine = engine_with(provider);

        let result = engine.match_best(QUERY, &corpus, 0.0).await.unwrap();

        assert_eq!(result.name, "Alpha");
    }

    #[tokio::test]
    async fn test_top_n_sorted_and_truncated() {
        let engine = engine_with(language_provider());

        let matches = engine.top_n(QUERY, &language_corpus(), 10).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].name, "Go");
        assert!(matches[0].score >= matches[1].score);
    }

    #[tokio::test]
    async fn test_top_n_empty_corpus_returns_default() {
        let engine = engine_with(MockEmbeddingProvider::new(3));

        let matches = engine.top_n(QUERY, &StrategyCorpus::new(), 5).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, DEFAULT_STRATEGY_NAME);
    }

    #[tokio::test]
    async fn test_match_via_store_without_store_is_unsupported() {
        let engine = engine_with(language_provider());

        let result = engine.match_best_via_store(QUERY, 0.5).await;

        assert!(matches!(result, Err(DomainError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn test_match_via_store_returns_top_hit() {
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .upsert_strategy("Go", "strategies/go.md", GO_CONTENT, &[0.9, 0.1, 0.0])
            .await
            .unwrap();
        store
            .upsert_strategy("Python", "strategies/python.md", PYTHON_CONTENT, &[0.0, 1.0, 0.0])
            .await
            .unwrap();

        let retrieval = Arc::new(RetrievalService::new(
            Arc::new(language_provider()),
            None,
        ));
        let engine = MatchingEngine::new(retrieval).with_strategy_store(store);

        let result = engine.match_best_via_store(QUERY, 0.5).await.unwrap();

        assert_eq!(result.name, "Go");
        assert!(result.score > 0.9);
    }

    #[tokio::test]
    async fn test_match_via_store_empty_result_returns_default() {
        let store = Arc::new(InMemoryVectorStore::new());
        let retrieval = Arc::new(RetrievalService::new(
            Arc::new(language_provider()),
            None,
        ));
        let engine = MatchingEngine::new(retrieval).with_strategy_store(store);

        let result = engine.match_best_via_store(QUERY, 0.5).await.unwrap();

        assert_eq!(result.name, DEFAULT_STRATEGY_NAME);
        assert_eq!(result.score, 0.0);
    }
}
