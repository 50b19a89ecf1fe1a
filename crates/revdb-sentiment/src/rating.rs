//! Star-rating suffix appended to review text before classification.

use std::sync::LazyLock;

use regex::Regex;
use revdb_core::Rating;

/// Bracketed marker phrase for a 1–5 star rating.
#[must_use]
pub fn rating_suffix(rating: Rating) -> &'static str {
    match rating.get() {
        1 => "[1 yıldız - çok kötü deneyim]",
        2 => "[2 yıldız - kötü deneyim]",
        3 => "[3 yıldız - orta deneyim]",
        4 => "[4 yıldız - iyi deneyim]",
        _ => "[5 yıldız - mükemmel deneyim]",
    }
}

static RATING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d (?:yıldız|yildiz) - [^\]]*\]").expect("valid regex"));

static BARE_RELATIVE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:\d+\s*)?(?:bir\s+|an?\s+)?(?:gün|hafta|ay|yıl|day|week|month|year)s?\s+(?:önce|ago)\s*$",
    )
    .expect("valid regex")
});

static PUNCTUATION_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s.,\-]*$").expect("valid regex"));

/// Meaningful text is at least this many characters once the marker is gone.
const MIN_MEANINGFUL_CHARS: usize = 5;

/// Whether the text already mentions a star rating. Any occurrence of the
/// marker word counts, so reviewers who write it themselves are left alone.
#[must_use]
pub fn has_rating_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("yıldız") || lower.contains("yildiz")
}

/// Remove every bracketed rating marker.
#[must_use]
pub fn strip_rating_marker(text: &str) -> String {
    RATING_MARKER.replace_all(text, "").into_owned()
}

/// Append the rating marker when a rating is known and no marker exists.
/// Empty text becomes the bare marker.
#[must_use]
pub fn append_rating_suffix(text: &str, rating: Option<Rating>) -> String {
    let Some(rating) = rating else {
        return text.to_string();
    };
    if has_rating_marker(text) {
        return text.to_string();
    }
    let body = text.trim();
    let suffix = rating_suffix(rating);
    if body.is_empty() {
        suffix.to_string()
    } else {
        format!("{body} {suffix}")
    }
}

/// Text carrying no review content once the rating marker is removed:
/// punctuation only, a bare relative date such as "2 hafta önce", or fewer
/// than five characters.
#[must_use]
pub fn is_meaningless(text: &str) -> bool {
    let stripped = strip_rating_marker(text);
    let body = stripped.trim();
    PUNCTUATION_ONLY.is_match(body)
        || BARE_RELATIVE_DATE.is_match(body)
        || body.chars().count() < MIN_MEANINGFUL_CHARS
}
