//! `status` and `retry-failed`: queue inspection and requeueing.

use chrono::{DateTime, Utc};
use revdb_core::QueueStatus;
use revdb_db::StatusCount;

/// Failures listed by `status`.
const FAILED_PREVIEW_LIMIT: i64 = 10;
const FAILED_MESSAGE_CHARS: usize = 50;

/// Queue counts folded per status.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct QueueTally {
    pub(crate) pending: i64,
    pub(crate) processing: i64,
    pub(crate) completed: i64,
    pub(crate) failed: i64,
}

impl QueueTally {
    pub(crate) fn from_counts(counts: &[StatusCount]) -> Self {
        let mut tally = Self::default();
        for StatusCount { status, count } in counts {
            let slot = match status {
                QueueStatus::Pending => &mut tally.pending,
                QueueStatus::Processing => &mut tally.processing,
                QueueStatus::Completed => &mut tally.completed,
                QueueStatus::Failed(_) => &mut tally.failed,
            };
            *slot += count;
        }
        tally
    }

    /// Report rows in lifecycle order.
    fn rows(&self) -> [(&'static str, i64); 4] {
        [
            (QueueStatus::PENDING, self.pending),
            (QueueStatus::PROCESSING, self.processing),
            (QueueStatus::COMPLETED, self.completed),
            (QueueStatus::FAILED, self.failed),
        ]
    }

    fn total(&self) -> i64 {
        self.pending + self.processing + self.completed + self.failed
    }
}

/// Print per-status counts, pending discovery groups and recent failures.
///
/// # Errors
///
/// Returns an error if any queue query fails or a stored status is unknown.
pub(crate) async fn run_status(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let tally = QueueTally::from_counts(&revdb_db::count_by_status(pool).await?);

    println!("queue status");
    println!("{:<12} {:>8}", "STATUS", "COUNT");
    println!("{}", "-".repeat(21));
    for (status, count) in tally.rows() {
        println!("{status:<12} {count:>8}");
    }
    println!("{:<12} {:>8}", "total", tally.total());

    if tally.processing > 0 {
        println!();
        println!(
            "{} business(es) stuck in processing; an interrupted run left them claimed",
            tally.processing
        );
    }

    let groups = revdb_db::pending_groups(pool).await?;
    if !groups.is_empty() {
        println!();
        println!("pending by discovery query");
        println!("{:<20} {:<16} {:<16} {:>6}", "TYPE", "CITY", "DISTRICT", "COUNT");
        for group in &groups {
            println!(
                "{:<20} {:<16} {:<16} {:>6}",
                group.business_type, group.city, group.district, group.count
            );
        }
    }

    let failed = revdb_db::list_failed(pool, FAILED_PREVIEW_LIMIT).await?;
    if !failed.is_empty() {
        println!();
        println!("recent failures");
        for row in &failed {
            let QueueStatus::Failed(message) = row.queue_status()? else {
                continue;
            };
            println!(
                "  [{}] {} ({}): {}",
                format_timestamp(row.processed_at),
                row.business_name,
                row.district,
                revdb_sentiment::maintenance::truncate_for_display(&message, FAILED_MESSAGE_CHARS)
            );
        }
    }

    Ok(())
}

/// Move every failed business back to `pending` and print how many moved.
///
/// # Errors
///
/// Returns an error if the update fails.
pub(crate) async fn run_retry_failed(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let requeued = revdb_db::requeue_failed(pool).await?;
    if requeued == 0 {
        println!("no failed businesses to retry");
    } else {
        println!("requeued {requeued} failed business(es)");
    }
    Ok(())
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}
