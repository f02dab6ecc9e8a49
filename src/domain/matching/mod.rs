//! Strategy matching domain: corpus, match results, and the
//! token-frequency scorer.

mod tokenizer;

pub use tokenizer::{term_cosine_similarity, term_frequency, tokenize};

use serde::Serialize;
use std::collections::BTreeMap;

/// Name used for the synthetic fallback result.
pub const DEFAULT_STRATEGY_NAME: &str = "Default Strategy";

/// Provenance recorded for the synthetic fallback result.
pub const BUILT_IN_PATH: &str = "built-in";

/// Minimal built-in fallback strategy used when no other strategies are
/// available or no candidate clears the similarity threshold.
pub const DEFAULT_STRATEGY: &str = r#"# Default Strategy

This is a minimal default strategy that can be used when no other strategies are available.
It provides basic guidance for general queries and should be enhanced with domain-specific strategies.

## General Guidelines
- Understand the query context
- Identify key requirements
- Provide concise and relevant responses
- Ask clarifying questions when necessary
"#;

/// A matched strategy with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyMatch {
    /// Strategy name (derived from the source identifier)
    pub name: String,
    /// Provenance of the strategy text
    pub path: String,
    /// Similarity score
    pub score: f64,
    /// Strategy content
    pub content: String,
}

impl StrategyMatch {
    /// The synthetic result representing "no acceptable match".
    pub fn default_strategy() -> Self {
        Self {
            name: DEFAULT_STRATEGY_NAME.to_string(),
            path: BUILT_IN_PATH.to_string(),
            score: 0.0,
            content: DEFAULT_STRATEGY.to_string(),
        }
    }
}

/// A named strategy corpus.
///
/// Backed by `BTreeMap` so every iteration is in lexicographic name order,
/// which keeps matching deterministic regardless of load order.
#[derive(Debug, Clone, Default)]
pub struct StrategyCorpus {
    contents: BTreeMap<String, String>,
    paths: BTreeMap<String, String>,
}

impl StrategyCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A corpus holding only the built-in default strategy.
    pub fn with_default() -> Self {
        let mut corpus = Self::new();
        corpus.insert(DEFAULT_STRATEGY_NAME, BUILT_IN_PATH, DEFAULT_STRATEGY);
        corpus
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) {
        let name = name.into();
        self.paths.insert(name.clone(), path.into());
        self.contents.insert(name, content.into());
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn content(&self, name: &str) -> Option<&str> {
        self.contents.get(name).map(String::as_str)
    }

    /// Provenance for a strategy; the built-in path when unknown.
    pub fn path(&self, name: &str) -> &str {
        self.paths.get(name).map(String::as_str).unwrap_or(BUILT_IN_PATH)
    }

    /// Iterate `(name, content)` pairs in lexicographic name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.contents.iter()
    }
}

/// Find the best-matching strategy for a query using token-frequency
/// cosine similarity.
///
/// Strategies are scanned in lexicographic name order and the maximum is
/// tracked with a strict comparison, so the first strategy to reach the
/// top score wins ties. Falls back to the default result when the best
/// score is below `threshold` or the corpus is empty.
pub fn match_best_by_tokens(
    query: &str,
    corpus: &StrategyCorpus,
    threshold: f64,
) -> StrategyMatch {
    if corpus.is_empty() {
        return StrategyMatch::default_strategy();
    }

    let query_vector = term_frequency(query);

    let mut best: Option<StrategyMatch> = None;
    let mut best_score = -1.0;

    for (name, content) in corpus.iter() {
        let strategy_vector = term_frequency(content);
        let similarity = term_cosine_similarity(&query_vector, &strategy_vector);

        if similarity > best_score {
            best_score = similarity;
            best = Some(StrategyMatch {
                name: name.clone(),
                path: corpus.path(name).to_string(),
                score: similarity,
                content: content.clone(),
            });
        }
    }

    match best {
        Some(matched) if matched.score >= threshold => matched,
        _ => StrategyMatch::default_strategy(),
    }
}

/// Rank all strategies for a query by token-frequency cosine similarity
/// and return the top `n`, sorted descending by score.
pub fn top_n_by_tokens(query: &str, corpus: &StrategyCorpus, n: usize) -> Vec<StrategyMatch> {
    if corpus.is_empty() {
        return vec![StrategyMatch::default_strategy()];
    }

    let query_vector = term_frequency(query);

    let mut matches: Vec<StrategyMatch> = corpus
        .iter()
        .map(|(name, content)| {
            let strategy_vector = term_frequency(content);
            StrategyMatch {
                name: name.clone(),
                path: corpus.path(name).to_string(),
                score: term_cosine_similarity(&query_vector, &strategy_vector),
                content: content.clone(),
            }
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(n);

    matches
}
