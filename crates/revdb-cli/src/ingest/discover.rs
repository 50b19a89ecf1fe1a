use revdb_core::{DiscoveryQuery, IngestConfig};
use revdb_scraper::ReviewSource;

/// Counters for one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DiscoverStats {
    pub found: usize,
    pub queued: usize,
    pub already_queued: usize,
    pub failed: usize,
}

/// Enumerate businesses for `query` and queue each as `pending`.
///
/// Names already queued for the same query are skipped. A failed insert is
/// logged and counted; the remaining names are still processed.
///
/// # Errors
///
/// Returns an error if the source fails while listing businesses.
pub(crate) async fn run_discover<S>(
    pool: &sqlx::PgPool,
    source: &S,
    query: &DiscoveryQuery,
    ingest: &IngestConfig,
) -> anyhow::Result<DiscoverStats>
where
    S: ReviewSource + ?Sized,
{
    let names = source
        .discover_businesses(&query.raw, ingest.scroll_idle_limit)
        .await?;

    let mut stats = DiscoverStats {
        found: names.len(),
        ..DiscoverStats::default()
    };

    for name in &names {
        match revdb_db::enqueue_pending(pool, query, name).await {
            Ok(true) => {
                stats.queued += 1;
                tracing::info!(business = %name, "queued");
            }
            Ok(false) => {
                stats.already_queued += 1;
                tracing::debug!(business = %name, "already queued");
            }
            Err(e) => {
                stats.failed += 1;
                tracing::warn!(business = %name, error = %e, "failed to queue business");
            }
        }
    }

    Ok(stats)
}
