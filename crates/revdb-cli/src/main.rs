mod aspects;
mod ingest;
mod maintenance;
mod queue;

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "revdb")]
#[command(about = "Review ingestion and analysis for map-listing businesses")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Find businesses for "<business type> <city> <district>" and queue them
    Discover {
        /// Free-text query, e.g. `eczane İstanbul Kadıköy`
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Run the browser without a window
        #[arg(long)]
        headless: bool,
    },
    /// Collect reviews for pending businesses
    Collect {
        /// Maximum number of businesses to process
        #[arg(long)]
        limit: Option<usize>,
        /// Run the browser without a window
        #[arg(long)]
        headless: bool,
        /// Requeue failed businesses before collecting
        #[arg(long)]
        retry_failed: bool,
        /// Stop the run after this many seconds; finished businesses stay finished
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Show queue counts, pending groups and recent failures
    Status,
    /// Move every failed business back to pending
    RetryFailed,
    /// Clean stored comment text and remove duplicates
    Preprocess,
    /// Label unlabeled comments with the configured sentiment classifier
    Label,
    /// Score review aspects for a text or for stored comments
    Aspects {
        /// Review text to analyze
        text: Vec<String>,
        /// Star rating (1-5) blended into the scores
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,
        /// Analyze stored comments instead of a text
        #[arg(long, conflicts_with = "text")]
        all: bool,
        /// Number of stored comments to analyze with --all
        #[arg(long, default_value = "10")]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("revdb: no command given; run `revdb --help` for usage");
        return Ok(());
    };

    dotenvy::dotenv().ok();

    // A plain text analysis needs neither configuration nor a database.
    if let Commands::Aspects {
        text,
        rating,
        all: false,
        ..
    } = &command
    {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
        return aspects::run_aspects_text(&text.join(" "), *rating);
    }

    let config = revdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(config.ansi_logs())
        .init();

    let pool_config = revdb_db::PoolConfig::from_app_config(&config);
    let pool = revdb_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                revdb_db::ping(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = revdb_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
        },
        Commands::Discover { query, headless } => {
            revdb_db::run_migrations(&pool).await?;
            let ingest = config.ingest_config().with_headless(headless);
            ingest::run_discover_command(&pool, &config, &query.join(" "), &ingest).await?;
        }
        Commands::Collect {
            limit,
            headless,
            retry_failed,
            timeout_secs,
        } => {
            revdb_db::run_migrations(&pool).await?;
            if retry_failed {
                queue::run_retry_failed(&pool).await?;
            }
            let ingest = config
                .ingest_config()
                .with_headless(headless)
                .with_batch_limit(limit);
            ingest::run_collect_command(
                &pool,
                &config,
                &ingest,
                timeout_secs.map(Duration::from_secs),
            )
            .await?;
        }
        Commands::Status => queue::run_status(&pool).await?,
        Commands::RetryFailed => queue::run_retry_failed(&pool).await?,
        Commands::Preprocess => maintenance::run_preprocess(&pool).await?,
        Commands::Label => maintenance::run_label(&pool, &config).await?,
        Commands::Aspects { limit, .. } => aspects::run_aspects_all(&pool, limit).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
