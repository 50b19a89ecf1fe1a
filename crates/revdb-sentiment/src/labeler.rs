//! Clients for the external sentiment classifiers.
//!
//! Two interchangeable backends sit behind [`SentimentScorer`]: a five-way
//! multilingual text classifier served TEI-style on `/predict`, and a
//! classical model server that takes text plus numeric features.

use async_trait::async_trait;
use revdb_core::{ClassifierKind, Rating};
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;

/// Number of comments sent per classifier request.
pub const LABEL_BATCH_SIZE: usize = 32;

/// Texts are cut to this many characters before scoring.
pub const MAX_TEXT_CHARS: usize = 512;

/// Rating used for the feature model when a comment has none.
const DEFAULT_FEATURE_RATING: f64 = 3.0;

/// Five-way sentiment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentLabel {
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    VeryPositive,
}

impl SentimentLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::VeryNegative => "Very Negative",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Positive => "Positive",
            SentimentLabel::VeryPositive => "Very Positive",
        }
    }

    /// Contribution of this class to the weighted score.
    #[must_use]
    pub fn weight(self) -> f64 {
        match self {
            SentimentLabel::VeryNegative => -1.0,
            SentimentLabel::Negative => -0.5,
            SentimentLabel::Neutral => 0.0,
            SentimentLabel::Positive => 0.5,
            SentimentLabel::VeryPositive => 1.0,
        }
    }

    /// Parse a classifier label. Accepts `"Very Negative"`, `"very_negative"`
    /// and `"VERY-NEGATIVE"` spellings.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::UnknownLabel`] for anything else.
    pub fn parse(raw: &str) -> Result<Self, SentimentError> {
        let key = raw.trim().to_lowercase().replace(['_', '-'], " ");
        match key.as_str() {
            "very negative" => Ok(SentimentLabel::VeryNegative),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            "positive" => Ok(SentimentLabel::Positive),
            "very positive" => Ok(SentimentLabel::VeryPositive),
            _ => Err(SentimentError::UnknownLabel(raw.to_string())),
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One comment prepared for scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringInput {
    pub text: String,
    pub rating: Option<Rating>,
}

impl ScoringInput {
    /// Truncates `text` to [`MAX_TEXT_CHARS`] characters.
    #[must_use]
    pub fn new(text: &str, rating: Option<Rating>) -> Self {
        Self {
            text: text.chars().take(MAX_TEXT_CHARS).collect(),
            rating,
        }
    }
}

/// Label and optional score written back to a comment.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentScore {
    pub label: String,
    pub score: Option<f64>,
}

/// Scores a batch of comments; output order matches input order.
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    async fn score_batch(
        &self,
        inputs: &[ScoringInput],
    ) -> Result<Vec<SentimentScore>, SentimentError>;
}

/// Build the configured backend.
#[must_use]
pub fn build_scorer(kind: ClassifierKind, base_url: &str) -> Box<dyn SentimentScorer> {
    match kind {
        ClassifierKind::Multilingual => Box::new(MultilingualClassifier::new(base_url)),
        ClassifierKind::Features => Box::new(FeatureModelClient::new(base_url)),
    }
}

/// `Σ p·w` over the class probabilities, rounded to four decimals.
#[must_use]
pub fn weighted_score(probabilities: &[(SentimentLabel, f64)]) -> f64 {
    let sum: f64 = probabilities
        .iter()
        .map(|(label, p)| p * label.weight())
        .sum();
    (sum * 10_000.0).round() / 10_000.0
}

/// Highest-probability class and the weighted score.
///
/// # Errors
///
/// Returns [`SentimentError::Classifier`] when no probabilities are given.
pub fn summarize(
    probabilities: &[(SentimentLabel, f64)],
) -> Result<(SentimentLabel, f64), SentimentError> {
    let (best, _) = probabilities
        .iter()
        .copied()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or_else(|| SentimentError::Classifier("empty class distribution".to_string()))?;
    Ok((best, weighted_score(probabilities)))
}

fn predict_url(base_url: &str) -> String {
    format!("{}/predict", base_url.trim_end_matches('/'))
}

/// Five-way multilingual classifier behind a TEI `/predict` endpoint.
pub struct MultilingualClassifier {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: Vec<[&'a str; 1]>,
    raw_scores: bool,
    truncate: bool,
}

#[derive(Deserialize)]
struct ClassScore {
    label: String,
    score: f64,
}

impl MultilingualClassifier {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: predict_url(base_url),
        }
    }
}

#[async_trait]
impl SentimentScorer for MultilingualClassifier {
    async fn score_batch(
        &self,
        inputs: &[ScoringInput],
    ) -> Result<Vec<SentimentScore>, SentimentError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let request = PredictRequest {
            inputs: inputs.iter().map(|input| [input.text.as_str()]).collect(),
            raw_scores: false,
            truncate: true,
        };
        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(SentimentError::Classifier(format!(
                "classifier returned status {}",
                response.status()
            )));
        }

        let distributions: Vec<Vec<ClassScore>> = response.json().await.map_err(|e| {
            SentimentError::Classifier(format!("classifier response parse error: {e}"))
        })?;

        if distributions.len() != inputs.len() {
            return Err(SentimentError::Classifier(format!(
                "classifier returned {} predictions for {} inputs",
                distributions.len(),
                inputs.len()
            )));
        }

        distributions
            .into_iter()
            .map(|classes| -> Result<SentimentScore, SentimentError> {
                let probabilities = classes
                    .iter()
                    .map(|c| SentimentLabel::parse(&c.label).map(|label| (label, c.score)))
                    .collect::<Result<Vec<_>, _>>()?;
                let (label, score) = summarize(&probabilities)?;
                Ok(SentimentScore {
                    label: label.as_str().to_string(),
                    score: Some(score),
                })
            })
            .collect()
    }
}

/// Classical model server fed text plus `[rating, char length, word count]`.
pub struct FeatureModelClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FeatureInstance<'a> {
    pub text: &'a str,
    pub rating: f64,
    pub char_length: usize,
    pub word_count: usize,
}

impl<'a> FeatureInstance<'a> {
    #[must_use]
    pub fn from_input(input: &'a ScoringInput) -> Self {
        Self {
            text: &input.text,
            rating: input
                .rating
                .map_or(DEFAULT_FEATURE_RATING, |r| f64::from(r.get())),
            char_length: input.text.chars().count(),
            word_count: input.text.split_whitespace().count(),
        }
    }
}

#[derive(Serialize)]
struct FeatureRequest<'a> {
    instances: Vec<FeatureInstance<'a>>,
}

#[derive(Deserialize)]
struct FeatureResponse {
    predictions: Vec<FeaturePrediction>,
}

#[derive(Deserialize)]
struct FeaturePrediction {
    label: String,
    #[serde(default)]
    confidence: Option<f64>,
}

impl FeatureModelClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: predict_url(base_url),
        }
    }
}

#[async_trait]
impl SentimentScorer for FeatureModelClient {
    async fn score_batch(
        &self,
        inputs: &[ScoringInput],
    ) -> Result<Vec<SentimentScore>, SentimentError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let request = FeatureRequest {
            instances: inputs.iter().map(FeatureInstance::from_input).collect(),
        };
        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(SentimentError::Classifier(format!(
                "model server returned status {}",
                response.status()
            )));
        }

        let body: FeatureResponse = response.json().await.map_err(|e| {
            SentimentError::Classifier(format!("model server response parse error: {e}"))
        })?;

        if body.predictions.len() != inputs.len() {
            return Err(SentimentError::Classifier(format!(
                "model server returned {} predictions for {} inputs",
                body.predictions.len(),
                inputs.len()
            )));
        }

        Ok(body
            .predictions
            .into_iter()
            .map(|prediction| {
                tracing::debug!(
                    label = %prediction.label,
                    confidence = ?prediction.confidence,
                    "feature model prediction"
                );
                SentimentScore {
                    label: prediction.label,
                    score: None,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_in_common_spellings() {
        assert_eq!(
            SentimentLabel::parse("Very Negative").unwrap(),
            SentimentLabel::VeryNegative
        );
        assert_eq!(
            SentimentLabel::parse("very_positive").unwrap(),
            SentimentLabel::VeryPositive
        );
        assert_eq!(
            SentimentLabel::parse(" NEUTRAL ").unwrap(),
            SentimentLabel::Neutral
        );
        assert!(matches!(
            SentimentLabel::parse("LABEL_3"),
            Err(SentimentError::UnknownLabel(_))
        ));
    }

    #[test]
    fn weighted_score_uses_class_weights() {
        let probabilities = [
            (SentimentLabel::VeryNegative, 0.1),
            (SentimentLabel::Negative, 0.1),
            (SentimentLabel::Neutral, 0.2),
            (SentimentLabel::Positive, 0.3),
            (SentimentLabel::VeryPositive, 0.3),
        ];
        // -0.1 - 0.05 + 0 + 0.15 + 0.3
        assert!((weighted_score(&probabilities) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn weighted_score_rounds_to_four_decimals() {
        let probabilities = [(SentimentLabel::Positive, 0.123_456)];
        assert!((weighted_score(&probabilities) - 0.0617).abs() < 1e-12);
    }

    #[test]
    fn summarize_picks_the_most_likely_class() {
        let probabilities = [
            (SentimentLabel::Negative, 0.6),
            (SentimentLabel::Positive, 0.4),
        ];
        let (label, score) = summarize(&probabilities).unwrap();
        assert_eq!(label, SentimentLabel::Negative);
        assert!((score - -0.1).abs() < 1e-9);
    }

    #[test]
    fn summarize_rejects_empty_distribution() {
        assert!(matches!(
            summarize(&[]),
            Err(SentimentError::Classifier(_))
        ));
    }

    #[test]
    fn scoring_input_truncates_by_characters() {
        let long = "ç".repeat(MAX_TEXT_CHARS + 10);
        let input = ScoringInput::new(&long, None);
        assert_eq!(input.text.chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn feature_instance_defaults_missing_rating() {
        let input = ScoringInput::new("çok güzel yer", None);
        let instance = FeatureInstance::from_input(&input);
        assert!((instance.rating - 3.0).abs() < f64::EPSILON);
        assert_eq!(instance.char_length, 13);
        assert_eq!(instance.word_count, 3);
    }

    #[test]
    fn feature_instance_uses_known_rating() {
        let rating = Rating::try_from(5_i64).ok();
        let input = ScoringInput::new("harika", rating);
        assert!((FeatureInstance::from_input(&input).rating - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn predict_url_drops_trailing_slash() {
        assert_eq!(predict_url("http://tei:8080/"), "http://tei:8080/predict");
    }
}
