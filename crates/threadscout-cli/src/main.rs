mod cache;
mod crawl;
mod output;
mod progress;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cache::{CacheCommands, ResultCache};
use crate::crawl::CrawlArgs;

#[derive(Debug, Parser)]
#[command(name = "threadscout")]
#[command(about = "Keyword crawler for Reddit posts and comments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search subreddits, fetch comment threads and produce the selected outputs
    Crawl(Box<CrawlArgs>),
    /// Manage the local result cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

/// Installs the stderr `fmt` subscriber. `RUST_LOG` wins over `fallback_level`.
fn init_tracing(fallback_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before parsing: `env`-backed flags read variables from `.env` too.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl(args) => {
            let config = threadscout_core::load_app_config_from_env()?;
            init_tracing(&config.log_level)?;
            crawl::run_crawl(&config, &args).await?;
        }
        Commands::Cache {
            command: CacheCommands::Clear { cache_dir },
        } => {
            init_tracing("info")?;
            let removed = ResultCache::new(&cache_dir).clear()?;
            println!("removed {removed} cached result(s) from {}", cache_dir.display());
        }
    }

    Ok(())
}
