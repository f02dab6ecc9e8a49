//! Command-line interface

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::matching::{self, StrategyMatch};
use crate::infrastructure::corpus::load_strategy_corpus;
use crate::infrastructure::seeder::Seeder;

#[derive(Parser)]
#[command(name = "intent-matcher", about = "Match free-text queries against prompt strategies")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match a query against the strategy corpus
    #[command(name = "match")]
    Match(MatchArgs),
    /// Seed the persistent strategy table from the corpus
    Seed(SeedArgs),
}

#[derive(Args)]
pub struct MatchArgs {
    /// Free-text query to classify
    pub query: String,

    /// Directory containing strategy files
    #[arg(long)]
    pub dir: Option<String>,

    /// Strategy file extension
    #[arg(long)]
    pub ext: Option<String>,

    /// Similarity threshold for accepting a match
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Score with token-frequency cosine instead of embeddings
    #[arg(long)]
    pub tokens: bool,

    /// Match against the persistent strategy table
    #[arg(long)]
    pub use_store: bool,

    /// Show the top N matches instead of the single best
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Args)]
pub struct SeedArgs {
    /// Directory containing strategy files
    #[arg(long)]
    pub dir: Option<String>,

    /// Strategy file extension
    #[arg(long)]
    pub ext: Option<String>,
}

pub async fn run_match(mut config: AppConfig, args: MatchArgs) -> anyhow::Result<()> {
    if let Some(dir) = args.dir {
        config.matcher.strategy_dir = dir;
    }
    if let Some(ext) = args.ext {
        config.matcher.extension = ext;
    }
    if let Some(threshold) = args.threshold {
        config.matcher.threshold = threshold;
    }

    let corpus = load_strategy_corpus(&config.matcher.strategy_dir, &config.matcher.extension);
    let threshold = config.matcher.threshold;

    // Token scoring is pure and local; no provider or store is needed.
    if args.tokens {
        match args.top {
            Some(n) => print_matches(&matching::top_n_by_tokens(&args.query, &corpus, n)),
            None => print_match(&matching::match_best_by_tokens(&args.query, &corpus, threshold)),
        }
        return Ok(());
    }

    let engine = crate::build_engine(&config)
        .await
        .context("failed to build matching engine")?;

    if args.use_store || config.matcher.use_store {
        let result = engine.matching.match_best_via_store(&args.query, threshold).await?;
        print_match(&result);
        return Ok(());
    }

    match args.top {
        Some(n) => print_matches(&engine.matching.top_n(&args.query, &corpus, n).await?),
        None => print_match(&engine.matching.match_best(&args.query, &corpus, threshold).await?),
    }

    Ok(())
}

pub async fn run_seed(mut config: AppConfig, args: SeedArgs) -> anyhow::Result<()> {
    if let Some(dir) = args.dir {
        config.matcher.strategy_dir = dir;
    }
    if let Some(ext) = args.ext {
        config.matcher.extension = ext;
    }

    let engine = crate::build_engine(&config)
        .await
        .context("failed to build matching engine")?;

    let Some(store) = engine.strategy_store else {
        bail!("seeding requires a configured database url");
    };

    let corpus = load_strategy_corpus(&config.matcher.strategy_dir, &config.matcher.extension);
    let report = Seeder::new(engine.retrieval, store).seed(&corpus).await;

    println!(
        "Seeded {} strategies ({} unchanged, {} failed)",
        report.seeded, report.skipped, report.failed
    );

    Ok(())
}

fn print_match(result: &StrategyMatch) {
    println!("Strategy: {} (score {:.4})", result.name, result.score);
    println!("Path:     {}", result.path);
    println!();
    println!("{}", result.content);
}

fn print_matches(matches: &[StrategyMatch]) {
    for (rank, result) in matches.iter().enumerate() {
        println!(
            "{:>2}. {} (score {:.4}) [{}]",
            rank + 1,
            result.name,
            result.score,
            result.path
        );
    }
}
