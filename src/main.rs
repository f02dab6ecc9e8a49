use clap::Parser;
use intent_matcher::cli::{self, Cli, Command};
use intent_matcher::infrastructure::logging::init_logging;
use intent_matcher::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_logging(&config.logging);

    match cli.command {
        Command::Match(args) => cli::run_match(config, args).await,
        Command::Seed(args) => cli::run_seed(config, args).await,
    }
}
