//! Discovery and collection command handlers.
//!
//! Both stages drive a [`ReviewSource`]. The handlers here open a browser
//! session for the configured maps site, run the stage, and always close the
//! session again, also when the stage fails.

mod collect;
mod discover;

use std::time::Duration;

use revdb_core::{AppConfig, IngestConfig};
use revdb_scraper::{MapsOptions, MapsSource, ReviewSource, WebDriverClient};

pub(crate) use collect::{run_collect, CollectStats};
pub(crate) use discover::{run_discover, DiscoverStats};

/// Failure messages longer than this are cut in console output.
const DISPLAY_ERROR_CHARS: usize = 100;

async fn open_source(config: &AppConfig, headless: bool) -> anyhow::Result<MapsSource> {
    let driver = WebDriverClient::new(
        &config.webdriver_url,
        config.driver_timeout_secs,
        config.driver_max_retries,
        config.driver_retry_backoff_base_secs,
    )?;
    let options = MapsOptions::from_app_config(config, headless);
    Ok(MapsSource::connect(driver, options).await?)
}

async fn close_best_effort(source: &dyn ReviewSource) {
    if let Err(e) = source.close().await {
        tracing::warn!(error = %e, "failed to close browser session");
    }
}

/// Cut an error message for console output.
pub(crate) fn display_error(message: &str) -> String {
    revdb_sentiment::maintenance::truncate_for_display(message, DISPLAY_ERROR_CHARS)
}

/// `discover <query>`: parse, enumerate, enqueue, print the summary.
///
/// An unparseable query is logged and reported as zero results; it does not
/// fail the command.
///
/// # Errors
///
/// Returns an error if the browser session cannot be opened or the source
/// fails while listing businesses.
pub(crate) async fn run_discover_command(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    raw_query: &str,
    ingest: &IngestConfig,
) -> anyhow::Result<()> {
    let query = match revdb_core::DiscoveryQuery::parse(raw_query) {
        Ok(query) => query,
        Err(e) => {
            tracing::error!(query = raw_query, error = %e, "discovery query rejected");
            print_discover_summary(raw_query, &DiscoverStats::default());
            return Ok(());
        }
    };

    println!("discovering: {query}");
    let source = open_source(config, ingest.headless).await?;
    let outcome = run_discover(pool, &source, &query, ingest).await;
    close_best_effort(&source).await;

    let stats = outcome?;
    print_discover_summary(&query.raw, &stats);
    Ok(())
}

fn print_discover_summary(query: &str, stats: &DiscoverStats) {
    println!();
    println!("discovery finished: {query}");
    println!("  found:          {}", stats.found);
    println!("  newly queued:   {}", stats.queued);
    println!("  already queued: {}", stats.already_queued);
    if stats.failed > 0 {
        println!("  insert errors:  {}", stats.failed);
    }
}

/// `collect`: drain pending businesses and print the summary.
///
/// With a `timeout`, the run is cancelled once it elapses. Businesses that
/// finished before that keep their status; the one in flight stays
/// `processing`.
///
/// # Errors
///
/// Returns an error if the browser session cannot be opened, the store is
/// unreachable, or the timeout elapses.
pub(crate) async fn run_collect_command(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    ingest: &IngestConfig,
    timeout: Option<Duration>,
) -> anyhow::Result<()> {
    let limit = ingest.batch_limit.and_then(|n| i64::try_from(n).ok());
    if revdb_db::list_pending(pool, limit).await?.is_empty() {
        println!("no pending businesses; run `revdb discover` first");
        return Ok(());
    }

    let source = open_source(config, ingest.headless).await?;
    let outcome = match timeout {
        Some(timeout) => tokio::time::timeout(timeout, run_collect(pool, &source, ingest))
            .await
            .unwrap_or_else(|_| {
                Err(anyhow::anyhow!(
                    "collection timed out after {}s; completed businesses were kept",
                    timeout.as_secs()
                ))
            }),
        None => run_collect(pool, &source, ingest).await,
    };
    close_best_effort(&source).await;

    print_collect_summary(&outcome?);
    Ok(())
}

fn print_collect_summary(stats: &CollectStats) {
    println!();
    println!("collection finished");
    println!("  processed:      {}", stats.processed);
    println!("  succeeded:      {}", stats.success);
    println!("  failed:         {}", stats.failed);
    println!("  comments saved: {}", stats.total_comments);
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod tests;
