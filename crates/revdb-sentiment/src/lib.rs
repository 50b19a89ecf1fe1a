//! Text cleanup and sentiment scoring for stored reviews.
//!
//! Normalizes scraped review text, rewrites metric-only reviews into
//! summaries, appends star-rating markers, scores review aspects with a
//! Turkish lexicon, and talks to the external sentiment classifiers.

pub mod aspect;
pub mod error;
pub mod labeler;
pub mod maintenance;
pub mod metrics;
pub mod normalize;
pub mod rating;

pub use aspect::{analyze, format_report, AspectReport, AspectScore, Polarity};
pub use error::SentimentError;
pub use labeler::{
    build_scorer, FeatureModelClient, MultilingualClassifier, ScoringInput, SentimentLabel,
    SentimentScore, SentimentScorer, LABEL_BATCH_SIZE, MAX_TEXT_CHARS,
};
pub use maintenance::{plan_comment, CommentPlan, Disposition, PreprocessStats};
pub use metrics::{detect_metrics, is_metric_only, MetricCategory, MetricMatches};
pub use normalize::normalize;
pub use rating::{append_rating_suffix, has_rating_marker, is_meaningless, rating_suffix};
