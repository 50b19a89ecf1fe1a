//! `preprocess` and `label`: passes over comments already in the store.

use anyhow::Context;
use revdb_core::{AppConfig, Rating};
use revdb_sentiment::{
    plan_comment, Disposition, PreprocessStats, ScoringInput, SentimentScorer, LABEL_BATCH_SIZE,
};
use rust_decimal::Decimal;

/// Counters for one labeling run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LabelStats {
    pub total: usize,
    pub labeled: usize,
    pub failed_batches: usize,
}

/// Remove exact duplicates, then clean, rewrite, suffix or delete each
/// stored comment.
///
/// # Errors
///
/// Returns an error if a store query fails.
pub(crate) async fn preprocess_pass(pool: &sqlx::PgPool) -> anyhow::Result<PreprocessStats> {
    let mut stats = PreprocessStats {
        duplicates_removed: revdb_db::delete_exact_duplicates(pool)
            .await
            .context("failed to remove duplicate comments")?,
        ..PreprocessStats::default()
    };

    for comment in revdb_db::list_comments(pool).await? {
        let rating = match comment.rating() {
            Ok(rating) => rating,
            Err(e) => {
                tracing::warn!(id = comment.id, error = %e, "skipping comment with invalid rating");
                continue;
            }
        };

        let plan = plan_comment(&comment.comment_text, rating);
        stats.record(comment.id, &comment.comment_text, &plan);

        match &plan.disposition {
            Disposition::Delete => {
                revdb_db::delete_comment(pool, comment.id).await?;
            }
            Disposition::Update(text) => {
                revdb_db::update_comment_text(pool, comment.id, text).await?;
            }
            Disposition::Unchanged => {}
        }
    }

    Ok(stats)
}

/// `preprocess`: run the maintenance pass and print its report.
///
/// # Errors
///
/// Returns an error if a store query fails.
pub(crate) async fn run_preprocess(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let stats = preprocess_pass(pool).await?;

    println!("preprocessing finished");
    println!("  comments checked:     {}", stats.total);
    println!("  updated:              {}", stats.updated);
    println!("  deleted:              {}", stats.deleted);
    println!("  duplicates removed:   {}", stats.duplicates_removed);
    println!("  metric rewrites:      {}", stats.metric_rewrites);
    println!("  rating suffix added:  {}", stats.rating_added);
    println!("  already suffixed:     {}", stats.already_suffixed);
    println!("  meaningless fixed:    {}", stats.meaningless_fixed);

    if !stats.examples.is_empty() {
        println!();
        println!("metric rewrite examples");
        for example in &stats.examples {
            println!("  #{}", example.id);
            println!("    before: {}", example.before);
            println!("    after:  {}", example.after);
        }
    }

    Ok(())
}

/// Score every unlabeled comment with `scorer` in fixed-size batches.
///
/// A batch the classifier rejects is logged and skipped, leaving its
/// comments unlabeled for the next run.
///
/// # Errors
///
/// Returns an error if the unlabeled comments cannot be read or a label
/// cannot be written.
pub(crate) async fn label_comments(
    pool: &sqlx::PgPool,
    scorer: &dyn SentimentScorer,
) -> anyhow::Result<LabelStats> {
    let rows = revdb_db::list_unlabeled(pool).await?;
    let mut stats = LabelStats {
        total: rows.len(),
        ..LabelStats::default()
    };

    for (batch_index, batch) in rows.chunks(LABEL_BATCH_SIZE).enumerate() {
        let inputs: Vec<ScoringInput> = batch
            .iter()
            .map(|row| {
                let rating = row
                    .rating
                    .and_then(|r| Rating::try_from(i64::from(r)).ok());
                ScoringInput::new(&row.comment_text, rating)
            })
            .collect();

        let scores = match scorer.score_batch(&inputs).await {
            Ok(scores) => scores,
            Err(e) => {
                stats.failed_batches += 1;
                tracing::warn!(batch = batch_index, size = batch.len(), error = %e, "classifier batch failed; skipping");
                continue;
            }
        };

        for (row, score) in batch.iter().zip(scores) {
            let decimal = score
                .score
                .and_then(Decimal::from_f64_retain)
                .map(|d| d.round_dp(4));
            revdb_db::apply_sentiment(pool, row.id, &score.label, decimal).await?;
            stats.labeled += 1;
        }
        tracing::info!(labeled = stats.labeled, total = stats.total, "labeling progress");
    }

    Ok(stats)
}

/// `label`: label unlabeled comments with the configured classifier.
///
/// # Errors
///
/// Returns an error if no classifier URL is configured or the store fails.
pub(crate) async fn run_label(pool: &sqlx::PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let url = config
        .classifier_url
        .as_deref()
        .context("REVDB_CLASSIFIER_URL is not set; the label command needs a classifier endpoint")?;
    let scorer = revdb_sentiment::build_scorer(config.classifier_kind, url);
    println!("labeling with the {} classifier at {url}", config.classifier_kind);

    let stats = label_comments(pool, scorer.as_ref()).await?;

    println!();
    println!("labeling finished");
    println!("  unlabeled comments: {}", stats.total);
    println!("  labeled:            {}", stats.labeled);
    if stats.failed_batches > 0 {
        println!("  failed batches:     {}", stats.failed_batches);
    }
    Ok(())
}

#[cfg(test)]
#[path = "maintenance_test.rs"]
mod tests;
