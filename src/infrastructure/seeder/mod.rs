//! Bulk strategy seeding

use std::sync::Arc;

use crate::domain::matching::StrategyCorpus;
use crate::domain::store::StrategyStore;
use crate::infrastructure::retrieval::RetrievalService;

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Records the upsert actually inserted or updated
    pub seeded: u64,
    /// Records skipped because content and path were unchanged
    pub skipped: u64,
    /// Records dropped due to an embedding or upsert failure
    pub failed: u64,
}

impl SeedReport {
    pub fn total(&self) -> u64 {
        self.seeded + self.skipped + self.failed
    }
}

/// Populates the persistent strategy table from a corpus, resolving each
/// strategy's embedding through the retrieval service.
#[derive(Debug)]
pub struct Seeder {
    retrieval: Arc<RetrievalService>,
    store: Arc<dyn StrategyStore>,
}

impl Seeder {
    pub fn new(retrieval: Arc<RetrievalService>, store: Arc<dyn StrategyStore>) -> Self {
        Self { retrieval, store }
    }

    /// Seed every strategy in the corpus. A failure on one item is logged
    /// and counted; the rest of the batch continues.
    pub async fn seed(&self, corpus: &StrategyCorpus) -> SeedReport {
        let mut report = SeedReport::default();

        for (name, content) in corpus.iter() {
            let embedding = match self.retrieval.get(content).await {
                Ok(embedding) => embedding,
                Err(error) => {
                    tracing::error!(strategy = %name, %error, "Embedding failed");
                    report.failed += 1;
                    continue;
                }
            };

            let path = corpus.path(name);
            match self.store.upsert_strategy(name, path, content, &embedding).await {
                Ok(0) => {
                    tracing::debug!(strategy = %name, "Strategy unchanged, skipped");
                    report.skipped += 1;
                }
                Ok(_) => {
                    tracing::info!(strategy = %name, "Strategy seeded");
                    report.seeded += 1;
                }
                Err(error) => {
                    tracing::error!(strategy = %name, %error, "Upsert failed");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            seeded = report.seeded,
            skipped = report.skipped,
            failed = report.failed,
            "Seeding complete"
        );

        report
    }
}
