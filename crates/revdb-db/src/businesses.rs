//! Database operations for the `businesses` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `businesses` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BusinessRow {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub district: String,
    pub created_at: DateTime<Utc>,
}

/// Returns the id of the business identified by `(name, city, district)`,
/// creating it on first use.
///
/// The no-op `DO UPDATE` makes `RETURNING` yield the existing row's id on
/// conflict, so the lookup is a single round-trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn get_or_create_business(
    pool: &PgPool,
    name: &str,
    city: &str,
    district: &str,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO businesses (name, city, district) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (name, city, district) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id",
    )
    .bind(name)
    .bind(city)
    .bind(district)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Fetches a business by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if the
/// query fails.
pub async fn get_business(pool: &PgPool, id: i64) -> Result<BusinessRow, DbError> {
    sqlx::query_as::<_, BusinessRow>(
        "SELECT id, name, city, district, created_at FROM businesses WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
