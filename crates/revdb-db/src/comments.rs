//! Database operations for the `comments` table: the signature store, the
//! batch persister, maintenance rewrites and sentiment labels.

use rust_decimal::Decimal;
use sqlx::PgPool;

use revdb_core::{Rating, ReviewRecord, Signature, SignatureSet};

use crate::DbError;

/// A row from the `comments` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub business_id: i64,
    pub username: String,
    pub rating: Option<i16>,
    pub date: Option<String>,
    pub comment_text: String,
    pub likes: i32,
    pub sentiment: Option<String>,
    pub sentiment_score: Option<Decimal>,
}

impl CommentRow {
    /// The stored rating as a domain value. The column is CHECK-constrained
    /// to 1-5, so a conversion failure means the row was written out of band.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] for ratings outside 1-5.
    pub fn rating(&self) -> Result<Option<Rating>, DbError> {
        self.rating
            .map(|r| Rating::try_from(i64::from(r)))
            .transpose()
            .map_err(|e| DbError::InvalidRow {
                id: self.id,
                reason: e.to_string(),
            })
    }
}

/// Projection used by the sentiment labeler.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UnlabeledCommentRow {
    pub id: i64,
    pub rating: Option<i16>,
    pub comment_text: String,
}

/// Projection used by aspect analysis over stored comments.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisCommentRow {
    pub id: i64,
    pub business_name: String,
    pub username: String,
    pub rating: Option<i16>,
    pub comment_text: String,
}

#[derive(sqlx::FromRow)]
struct SignatureRow {
    id: i64,
    signature_hash: String,
    username: String,
    rating: Option<i16>,
    comment_text: String,
}

/// Loads every known signature digest for a business.
///
/// Each row contributes the digest recorded at insert time plus a digest of
/// its current values, so a review whose text was later rewritten by the
/// maintenance pass still matches when it is scraped again.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// for a stored rating outside 1-5.
pub async fn signatures_for(pool: &PgPool, business_id: i64) -> Result<SignatureSet, DbError> {
    let rows = sqlx::query_as::<_, SignatureRow>(
        "SELECT id, signature_hash, username, rating, comment_text \
         FROM comments \
         WHERE business_id = $1",
    )
    .bind(business_id)
    .fetch_all(pool)
    .await?;

    let mut digests = Vec::with_capacity(rows.len() * 2);
    for row in rows {
        let rating = row
            .rating
            .map(|r| Rating::try_from(i64::from(r)))
            .transpose()
            .map_err(|e| DbError::InvalidRow {
                id: row.id,
                reason: e.to_string(),
            })?;
        digests.push(Signature::new(&row.username, rating, &row.comment_text).digest());
        digests.push(row.signature_hash.trim().to_string());
    }

    Ok(SignatureSet::from_digests(digests))
}

/// Writes a batch of reviews for one business inside a single transaction.
///
/// All-or-nothing: if the insert fails the transaction is rolled back on drop
/// and the error is returned, so the caller retries the whole business.
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert or commit fails.
pub async fn persist_comments(
    pool: &PgPool,
    business_id: i64,
    records: &[ReviewRecord],
) -> Result<u64, DbError> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut usernames: Vec<String> = Vec::with_capacity(records.len());
    let mut ratings: Vec<Option<i16>> = Vec::with_capacity(records.len());
    let mut dates: Vec<Option<String>> = Vec::with_capacity(records.len());
    let mut texts: Vec<String> = Vec::with_capacity(records.len());
    let mut likes: Vec<i32> = Vec::with_capacity(records.len());
    let mut hashes: Vec<String> = Vec::with_capacity(records.len());

    for record in records {
        usernames.push(record.username.clone());
        ratings.push(record.rating.map(|r| i16::from(r.get())));
        dates.push(record.date.clone());
        texts.push(record.text.clone());
        likes.push(i32::try_from(record.likes).unwrap_or(i32::MAX));
        hashes.push(Signature::of(record).digest());
    }

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO comments \
             (business_id, username, rating, date, comment_text, likes, signature_hash) \
         SELECT $1, * FROM UNNEST(\
              $2::text[], $3::int2[], $4::text[], $5::text[], $6::int4[], $7::text[])",
    )
    .bind(business_id)
    .bind(&usernames)
    .bind(&ratings)
    .bind(&dates)
    .bind(&texts)
    .bind(&likes)
    .bind(&hashes)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(result.rows_affected())
}

/// Returns every stored comment ordered by id, for the maintenance pass.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_comments(pool: &PgPool) -> Result<Vec<CommentRow>, DbError> {
    let rows = sqlx::query_as::<_, CommentRow>(
        "SELECT id, business_id, username, rating, date, comment_text, likes, \
                sentiment, sentiment_score \
         FROM comments \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Rewrites a comment's text in place.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the comment does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_comment_text(pool: &PgPool, id: i64, text: &str) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE comments SET comment_text = $1 WHERE id = $2")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Deletes one comment. Returns whether a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_comment(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Removes exact duplicates by `(business_id, username, comment_text)`,
/// keeping the lowest id of each group. Returns the number of rows deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_exact_duplicates(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query(
        "DELETE FROM comments c \
         USING comments keep \
         WHERE c.business_id = keep.business_id \
           AND c.username = keep.username \
           AND c.comment_text = keep.comment_text \
           AND c.id > keep.id",
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Comments that have not been labeled yet, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_unlabeled(pool: &PgPool) -> Result<Vec<UnlabeledCommentRow>, DbError> {
    let rows = sqlx::query_as::<_, UnlabeledCommentRow>(
        "SELECT id, rating, comment_text \
         FROM comments \
         WHERE sentiment IS NULL OR sentiment = '' \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Stores the sentiment label and optional score for one comment.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the comment does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn apply_sentiment(
    pool: &PgPool,
    id: i64,
    label: &str,
    score: Option<Decimal>,
) -> Result<(), DbError> {
    let result =
        sqlx::query("UPDATE comments SET sentiment = $1, sentiment_score = $2 WHERE id = $3")
            .bind(label)
            .bind(score)
            .bind(id)
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Non-empty comments joined with their business name, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_comments_for_analysis(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<AnalysisCommentRow>, DbError> {
    let rows = sqlx::query_as::<_, AnalysisCommentRow>(
        "SELECT c.id, b.name AS business_name, c.username, c.rating, c.comment_text \
         FROM comments c \
         JOIN businesses b ON b.id = c.business_id \
         WHERE c.comment_text <> '' \
         ORDER BY c.id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
