//! The persistent business queue (`pending_businesses`).
//!
//! Every status change is a guarded `UPDATE ... WHERE status = <expected>`;
//! a guard miss surfaces as [`DbError::InvalidQueueTransition`] instead of
//! silently rewriting a row that moved on.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use revdb_core::{DiscoveryQuery, QueueStatus};

use crate::DbError;

const PENDING_COLUMNS: &str = "id, business_type, city, district, business_name, status, \
                               created_at, processed_at, error_message";

/// A row from the `pending_businesses` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PendingBusinessRow {
    pub id: i64,
    pub business_type: String,
    pub city: String,
    pub district: String,
    pub business_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl PendingBusinessRow {
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] if the stored status is unknown.
    pub fn queue_status(&self) -> Result<QueueStatus, DbError> {
        QueueStatus::from_row(&self.status, self.error_message.clone()).map_err(|e| {
            DbError::InvalidRow {
                id: self.id,
                reason: e.to_string(),
            }
        })
    }
}

/// Number of queue entries in one status. A `Failed` count carries no
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: QueueStatus,
    pub count: i64,
}

#[derive(sqlx::FromRow)]
struct StatusCountRow {
    status: String,
    count: i64,
}

/// Pending entries grouped by the discovery query that produced them.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PendingGroupRow {
    pub business_type: String,
    pub city: String,
    pub district: String,
    pub count: i64,
}

/// A queue entry that this process moved to `processing`.
///
/// Only [`claim_pending`] constructs one, and [`complete_claimed`] /
/// [`fail_claimed`] consume it, so a business can only be finished after it
/// was claimed and only once per claim.
#[derive(Debug)]
pub struct ClaimedBusiness {
    row: PendingBusinessRow,
}

impl ClaimedBusiness {
    #[must_use]
    pub fn id(&self) -> i64 {
        self.row.id
    }

    #[must_use]
    pub fn business_type(&self) -> &str {
        &self.row.business_type
    }

    #[must_use]
    pub fn business_name(&self) -> &str {
        &self.row.business_name
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.row.city
    }

    #[must_use]
    pub fn district(&self) -> &str {
        &self.row.district
    }

    /// The query sent to the listing site when searching for this business.
    #[must_use]
    pub fn search_query(&self) -> String {
        format!(
            "{} {} {}",
            self.row.business_name, self.row.city, self.row.district
        )
    }
}

/// Inserts a discovered business as `pending` unless the same
/// `(business_type, city, district, business_name)` is already queued.
///
/// Returns `true` when a new row was inserted. Re-discovery is a no-op, not an
/// error.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn enqueue_pending(
    pool: &PgPool,
    query: &DiscoveryQuery,
    business_name: &str,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO pending_businesses (business_type, city, district, business_name, status) \
         VALUES ($1, $2, $3, $4, 'pending') \
         ON CONFLICT (business_type, city, district, business_name) DO NOTHING",
    )
    .bind(&query.business_type)
    .bind(&query.city)
    .bind(&query.district)
    .bind(business_name)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Pending entries in FIFO order. `None` returns all of them.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_pending(
    pool: &PgPool,
    limit: Option<i64>,
) -> Result<Vec<PendingBusinessRow>, DbError> {
    // LIMIT NULL is LIMIT ALL in Postgres.
    let rows = sqlx::query_as::<_, PendingBusinessRow>(&format!(
        "SELECT {PENDING_COLUMNS} \
         FROM pending_businesses \
         WHERE status = 'pending' \
         ORDER BY created_at ASC, id ASC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Moves a `pending` entry to `processing` and commits immediately.
///
/// # Errors
///
/// Returns [`DbError::InvalidQueueTransition`] if the row is missing or not
/// `pending`, or [`DbError::Sqlx`] if the update fails.
pub async fn claim_pending(pool: &PgPool, id: i64) -> Result<ClaimedBusiness, DbError> {
    let row = sqlx::query_as::<_, PendingBusinessRow>(&format!(
        "UPDATE pending_businesses \
         SET status = 'processing' \
         WHERE id = $1 AND status = 'pending' \
         RETURNING {PENDING_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::InvalidQueueTransition {
        id,
        expected_status: QueueStatus::PENDING,
    })?;

    Ok(ClaimedBusiness { row })
}

/// Marks a claimed entry `completed` with `processed_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidQueueTransition`] if the row is no longer
/// `processing`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_claimed(pool: &PgPool, claimed: ClaimedBusiness) -> Result<(), DbError> {
    let id = claimed.id();
    let result = sqlx::query(
        "UPDATE pending_businesses \
         SET status = 'completed', processed_at = NOW(), error_message = NULL \
         WHERE id = $1 AND status = 'processing'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidQueueTransition {
            id,
            expected_status: QueueStatus::PROCESSING,
        });
    }

    Ok(())
}

/// Marks a claimed entry `failed`, recording the cause and `processed_at`.
///
/// # Errors
///
/// Returns [`DbError::InvalidQueueTransition`] if the row is no longer
/// `processing`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_claimed(
    pool: &PgPool,
    claimed: ClaimedBusiness,
    error_message: &str,
) -> Result<(), DbError> {
    let id = claimed.id();
    let result = sqlx::query(
        "UPDATE pending_businesses \
         SET status = 'failed', processed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'processing'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidQueueTransition {
            id,
            expected_status: QueueStatus::PROCESSING,
        });
    }

    Ok(())
}

/// Moves every `failed` entry back to `pending`, clearing the error and
/// `processed_at`. `completed` and `processing` rows are untouched.
///
/// Returns the number of requeued rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn requeue_failed(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE pending_businesses \
         SET status = 'pending', error_message = NULL, processed_at = NULL \
         WHERE status = 'failed'",
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Row counts per status, ordered by status name. Statuses without rows are
/// absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::Core`] if a
/// stored status is unknown.
pub async fn count_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, DbError> {
    let rows = sqlx::query_as::<_, StatusCountRow>(
        "SELECT status, COUNT(*) AS count \
         FROM pending_businesses \
         GROUP BY status \
         ORDER BY status",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| -> Result<StatusCount, DbError> {
            Ok(StatusCount {
                status: QueueStatus::from_row(&row.status, None)?,
                count: row.count,
            })
        })
        .collect()
}

/// Pending counts grouped by `(business_type, city, district)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn pending_groups(pool: &PgPool) -> Result<Vec<PendingGroupRow>, DbError> {
    let rows = sqlx::query_as::<_, PendingGroupRow>(
        "SELECT business_type, city, district, COUNT(*) AS count \
         FROM pending_businesses \
         WHERE status = 'pending' \
         GROUP BY business_type, city, district \
         ORDER BY business_type, city, district",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Most recently processed failures first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_failed(pool: &PgPool, limit: i64) -> Result<Vec<PendingBusinessRow>, DbError> {
    let rows = sqlx::query_as::<_, PendingBusinessRow>(&format!(
        "SELECT {PENDING_COLUMNS} \
         FROM pending_businesses \
         WHERE status = 'failed' \
         ORDER BY processed_at DESC NULLS LAST, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches a single queue entry by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if the
/// query fails.
pub async fn get_pending_business(pool: &PgPool, id: i64) -> Result<PendingBusinessRow, DbError> {
    sqlx::query_as::<_, PendingBusinessRow>(&format!(
        "SELECT {PENDING_COLUMNS} FROM pending_businesses WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
