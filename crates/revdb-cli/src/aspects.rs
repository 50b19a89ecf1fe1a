//! `aspects`: lexicon-based aspect scores for a text or stored comments.

use anyhow::Context;
use revdb_core::Rating;
use revdb_sentiment::{analyze, format_report};

/// Characters of a stored comment echoed above its report.
const PREVIEW_CHARS: usize = 100;

/// Analyze one review text given on the command line.
///
/// # Errors
///
/// Returns an error if `text` is blank.
pub(crate) fn run_aspects_text(text: &str, rating: Option<u8>) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("provide a review text, or use --all to analyze stored comments");
    }
    let rating = rating
        .map(|r| Rating::try_from(i64::from(r)))
        .transpose()
        .context("invalid --rating")?;

    println!("{}", format_report(&analyze(text, rating)));
    Ok(())
}

/// Analyze the `limit` most recent non-empty stored comments.
///
/// # Errors
///
/// Returns an error if the comments cannot be read.
pub(crate) async fn run_aspects_all(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let rows = revdb_db::list_comments_for_analysis(pool, limit).await?;
    if rows.is_empty() {
        println!("no comments to analyze");
        return Ok(());
    }

    for (index, row) in rows.iter().enumerate() {
        let rating = row
            .rating
            .and_then(|r| Rating::try_from(i64::from(r)).ok());
        let report = analyze(&row.comment_text, rating);

        println!("{}", "=".repeat(60));
        println!(
            "[{}/{}] #{} {} / {}",
            index + 1,
            rows.len(),
            row.id,
            row.business_name,
            row.username
        );
        println!(
            "  {}",
            revdb_sentiment::maintenance::truncate_for_display(&row.comment_text, PREVIEW_CHARS)
        );
        println!("{}", format_report(&report));
    }

    Ok(())
}
