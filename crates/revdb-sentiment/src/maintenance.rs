//! Per-comment planning for the text maintenance pass.
//!
//! [`plan_comment`] is pure: it decides what should happen to one stored
//! comment and leaves the database writes to the caller.

use revdb_core::Rating;

use crate::metrics::{detect_metrics, is_metric_only};
use crate::normalize::normalize;
use crate::rating::{
    append_rating_suffix, has_rating_marker, is_meaningless, rating_suffix, strip_rating_marker,
};

/// Maximum characters kept in a before/after example.
const EXAMPLE_CHARS: usize = 80;

/// Number of metric rewrites kept as examples in the report.
const MAX_EXAMPLES: usize = 3;

/// What to do with a stored comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// No rating and no remaining text.
    Delete,
    /// Replace the stored text.
    Update(String),
    Unchanged,
}

/// The outcome for one comment plus which rewrites fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPlan {
    pub disposition: Disposition,
    /// The text was rewritten as a metric summary.
    pub metric_summary: Option<String>,
    pub rating_added: bool,
    pub already_suffixed: bool,
    pub meaningless_fixed: bool,
}

/// Decide the cleaned text and disposition for one comment.
///
/// Steps: normalize, rewrite metric-only text as a summary (skipped when a
/// rating marker is already present), append the rating suffix, reduce
/// meaningless text to the bare suffix, then delete when nothing is left
/// and the comment has no rating.
#[must_use]
pub fn plan_comment(original: &str, rating: Option<Rating>) -> CommentPlan {
    let mut text = normalize(original);
    let suffixed = has_rating_marker(&text);

    let mut metric_summary = None;
    let body = strip_rating_marker(&text);
    let body = body.trim();
    if !suffixed && is_metric_only(body) {
        let summary = detect_metrics(body).summary();
        if !summary.is_empty() {
            text.clone_from(&summary);
            metric_summary = Some(summary);
        }
    }

    let mut rating_added = false;
    if rating.is_some() && !suffixed {
        let appended = append_rating_suffix(&text, rating);
        rating_added = appended != text;
        text = appended;
    }

    let mut meaningless_fixed = false;
    if let Some(rating) = rating {
        if is_meaningless(&text) {
            text = rating_suffix(rating).to_string();
            meaningless_fixed = true;
        }
    }

    let remaining = strip_rating_marker(&text);
    let disposition = if remaining.trim().is_empty() && rating.is_none() {
        Disposition::Delete
    } else if text == original {
        Disposition::Unchanged
    } else {
        Disposition::Update(text)
    };

    CommentPlan {
        disposition,
        metric_summary,
        rating_added,
        already_suffixed: suffixed,
        meaningless_fixed,
    }
}

/// A metric rewrite shown in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricExample {
    pub id: i64,
    pub before: String,
    pub after: String,
}

/// Counters for one maintenance run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocessStats {
    pub total: usize,
    pub updated: usize,
    pub deleted: usize,
    pub duplicates_removed: u64,
    pub metric_rewrites: usize,
    pub rating_added: usize,
    pub already_suffixed: usize,
    pub meaningless_fixed: usize,
    pub examples: Vec<MetricExample>,
}

impl PreprocessStats {
    /// Count a planned comment. `original` is only used for the example list.
    pub fn record(&mut self, id: i64, original: &str, plan: &CommentPlan) {
        self.total += 1;
        match plan.disposition {
            Disposition::Delete => self.deleted += 1,
            Disposition::Update(_) => self.updated += 1,
            Disposition::Unchanged => {}
        }
        if let Some(summary) = &plan.metric_summary {
            self.metric_rewrites += 1;
            if self.examples.len() < MAX_EXAMPLES {
                self.examples.push(MetricExample {
                    id,
                    before: truncate_for_display(original, EXAMPLE_CHARS),
                    after: truncate_for_display(summary, EXAMPLE_CHARS),
                });
            }
        }
        if plan.rating_added {
            self.rating_added += 1;
        }
        if plan.already_suffixed {
            self.already_suffixed += 1;
        }
        if plan.meaningless_fixed {
            self.meaningless_fixed += 1;
        }
    }
}

/// Cut `text` to `max` characters, marking the cut with `...`.
#[must_use]
pub fn truncate_for_display(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}...")
}
