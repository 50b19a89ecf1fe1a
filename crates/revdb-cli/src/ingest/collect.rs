use anyhow::Context;
use revdb_core::{IngestConfig, ReviewRecord};
use revdb_db::{ClaimedBusiness, DbError};
use revdb_scraper::{ReviewSource, ScraperError};

/// Counters for one collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CollectStats {
    pub processed: usize,
    pub success: usize,
    pub failed: usize,
    pub total_comments: u64,
}

/// Drain up to `ingest.batch_limit` pending businesses in FIFO order.
///
/// Each business is claimed, collected and marked `completed`, or marked
/// `failed` with the error text. A failure never stops the run; only a lost
/// store connection does.
///
/// # Errors
///
/// Returns an error if the pending list cannot be read or a claim fails for a
/// reason other than the row no longer being `pending`.
pub(crate) async fn run_collect<S>(
    pool: &sqlx::PgPool,
    source: &S,
    ingest: &IngestConfig,
) -> anyhow::Result<CollectStats>
where
    S: ReviewSource + ?Sized,
{
    let limit = ingest.batch_limit.and_then(|n| i64::try_from(n).ok());
    let pending = revdb_db::list_pending(pool, limit)
        .await
        .context("failed to list pending businesses")?;

    let mut stats = CollectStats::default();
    let total = pending.len();

    for (index, row) in pending.into_iter().enumerate() {
        let claimed = match revdb_db::claim_pending(pool, row.id).await {
            Ok(claimed) => claimed,
            Err(DbError::InvalidQueueTransition { id, .. }) => {
                tracing::warn!(id, business = %row.business_name, "entry is no longer pending; skipping");
                continue;
            }
            Err(e) => return Err(e).context("failed to claim pending business"),
        };

        stats.processed += 1;
        println!(
            "[{}/{total}] {} ({} / {})",
            index + 1,
            claimed.business_name(),
            claimed.city(),
            claimed.district()
        );

        match collect_business(pool, source, &claimed, ingest).await {
            Ok(written) => match revdb_db::complete_claimed(pool, claimed).await {
                Ok(()) => {
                    stats.success += 1;
                    stats.total_comments += written;
                    println!("  saved {written} new comment(s)");
                }
                Err(e) => {
                    stats.failed += 1;
                    stats.total_comments += written;
                    println!("{}", completion_failure_line(written, &e.to_string()));
                    tracing::error!(id = row.id, error = %e, "failed to mark business completed");
                }
            },
            Err(e) => {
                let message = format!("{e:#}");
                println!("  failed: {}", super::display_error(&message));
                fail_business_best_effort(pool, claimed, &message).await;
                stats.failed += 1;
            }
        }

        if index + 1 < total && !ingest.inter_business_delay.is_zero() {
            tokio::time::sleep(ingest.inter_business_delay).await;
        }
    }

    Ok(stats)
}

/// Collect and persist new reviews for one claimed business.
///
/// Returns the number of comments written.
async fn collect_business<S>(
    pool: &sqlx::PgPool,
    source: &S,
    claimed: &ClaimedBusiness,
    ingest: &IngestConfig,
) -> anyhow::Result<u64>
where
    S: ReviewSource + ?Sized,
{
    let name = claimed.business_name();
    let business_id =
        revdb_db::get_or_create_business(pool, name, claimed.city(), claimed.district()).await?;

    if !source.search(&claimed.search_query(), name).await? {
        return Err(ScraperError::BusinessNotFound {
            name: name.to_string(),
        }
        .into());
    }

    let loaded = source.load_all_reviews(ingest.scroll_idle_limit).await?;
    let expanded = source.expand_truncated_text().await?;
    let fragments = source.extract_raw_reviews().await?;
    tracing::info!(business = %name, loaded, expanded, fragments = fragments.len(), "reviews extracted");

    let fragment_count = fragments.len();
    let records: Vec<ReviewRecord> = fragments
        .into_iter()
        .filter_map(revdb_core::ReviewFragment::into_record)
        .filter(is_worth_storing)
        .collect();
    if records.len() < fragment_count {
        tracing::debug!(
            business = %name,
            discarded = fragment_count - records.len(),
            "discarded unparseable or empty fragments"
        );
    }

    let mut known = revdb_db::signatures_for(pool, business_id).await?;
    let fresh = known.retain_new(records);
    let written = revdb_db::persist_comments(pool, business_id, &fresh)
        .await
        .with_context(|| format!("failed to save comments for {name}"))?;

    Ok(written)
}

/// Progress line for a business whose comments were saved but whose queue
/// entry could not be marked `completed`.
pub(crate) fn completion_failure_line(written: u64, error: &str) -> String {
    format!(
        "  saved {written} new comment(s) but failed to mark completed: {}",
        super::display_error(error)
    )
}

/// A record with neither a rating nor any text left after cleanup carries
/// nothing to analyze.
fn is_worth_storing(record: &ReviewRecord) -> bool {
    record.rating.is_some() || !revdb_sentiment::normalize(&record.text).is_empty()
}

async fn fail_business_best_effort(pool: &sqlx::PgPool, claimed: ClaimedBusiness, message: &str) {
    let id = claimed.id();
    if let Err(e) = revdb_db::fail_claimed(pool, claimed, message).await {
        tracing::error!(id, error = %e, "failed to mark business failed");
    }
}
