//! Selector-cascade resolution of raw review candidates.
//!
//! The browser side collects, for every review element, the values that each
//! selector in a fixed fallback order produced. Resolution here picks the
//! first candidate that satisfies a field's acceptance rule.

use serde::Deserialize;

use revdb_core::ReviewFragment;

/// Candidate values gathered from one review element, each list in selector
/// order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawReview {
    pub usernames: Vec<String>,
    /// `aria-label` values that may carry the star rating.
    pub rating_labels: Vec<String>,
    /// Number of filled star icons, used when no label carries a rating.
    pub star_icons: Option<u32>,
    pub dates: Vec<String>,
    pub texts: Vec<String>,
    /// The element's whole visible text.
    pub full_text: Option<String>,
    pub like_labels: Vec<String>,
}

const MIN_TEXT_CHARS: usize = 10;

const RELATIVE_DATE_WORDS: &[&str] = &[
    "önce", "gün", "hafta", "ay", "yıl", "dün", "bugün", "ago", "yesterday", "today",
];

const RELATIVE_DATE_PREFIXES: &[&str] = &["day", "week", "month", "year", "hour", "minute"];

/// Returns the first candidate for which `accept` yields a value.
pub fn first_match<I, S, T, F>(candidates: I, accept: F) -> Option<T>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(&str) -> Option<T>,
{
    let mut accept = accept;
    candidates.into_iter().find_map(|c| accept(c.as_ref()))
}

impl RawReview {
    #[must_use]
    pub fn resolve(&self) -> ReviewFragment {
        ReviewFragment {
            username: self.username(),
            rating: self.rating(),
            date: self.date(),
            text: Some(self.text()),
            likes: Some(self.likes()),
        }
    }

    fn username(&self) -> Option<String> {
        first_match(&self.usernames, |c| {
            let trimmed = c.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
    }

    fn rating(&self) -> Option<u8> {
        first_match(&self.rating_labels, |label| {
            leading_number(label).filter(|n| (1..=5).contains(n))
        })
        .and_then(|n| u8::try_from(n).ok())
        .or_else(|| {
            self.star_icons
                .filter(|n| (1..=5).contains(n))
                .and_then(|n| u8::try_from(n).ok())
        })
    }

    fn date(&self) -> Option<String> {
        first_match(&self.dates, |c| {
            let trimmed = c.trim();
            is_relative_date(trimmed).then(|| trimmed.to_string())
        })
    }

    fn text(&self) -> String {
        if let Some(text) = first_match(&self.texts, |c| {
            let trimmed = c.trim();
            (trimmed.chars().count() > MIN_TEXT_CHARS).then(|| trimmed.to_string())
        }) {
            return text;
        }

        // The first two lines of the element are the author and the date.
        self.full_text
            .as_deref()
            .map(|full| {
                full.lines()
                    .skip(2)
                    .collect::<Vec<_>>()
                    .join("\n")
                    .trim()
                    .to_string()
            })
            .filter(|rest| rest.chars().count() > MIN_TEXT_CHARS)
            .unwrap_or_default()
    }

    fn likes(&self) -> u32 {
        first_match(&self.like_labels, leading_number).unwrap_or(0)
    }
}

/// Parses the first run of ASCII digits in `s`.
fn leading_number(s: &str) -> Option<u32> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: String = s[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn is_relative_date(s: &str) -> bool {
    s.to_lowercase().split_whitespace().any(|token| {
        RELATIVE_DATE_WORDS.contains(&token)
            || RELATIVE_DATE_PREFIXES.iter().any(|p| token.starts_with(p))
    })
}
