//! Detection and summarization of metric-only reviews.
//!
//! Some reviewers fill in the listing's structured fields (service type,
//! price range, parking, ...) instead of writing prose. Those reviews are
//! rewritten into a compact `"Category: value. Category: value."` summary.

use std::sync::LazyLock;

use regex::Regex;

use crate::rating::strip_rating_marker;

/// A review with at most this many words and at least two metric phrases is
/// metric-only.
pub const METRIC_WORD_THRESHOLD: usize = 15;

/// Structured-field category shown on a listing review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricCategory {
    Service,
    Price,
    Wait,
    Seating,
    Parking,
    Atmosphere,
    Accessibility,
}

impl MetricCategory {
    pub const ALL: [MetricCategory; 7] = [
        MetricCategory::Service,
        MetricCategory::Price,
        MetricCategory::Wait,
        MetricCategory::Seating,
        MetricCategory::Parking,
        MetricCategory::Atmosphere,
        MetricCategory::Accessibility,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            MetricCategory::Service => "Service",
            MetricCategory::Price => "Price",
            MetricCategory::Wait => "Wait",
            MetricCategory::Seating => "Seating",
            MetricCategory::Parking => "Parking",
            MetricCategory::Atmosphere => "Atmosphere",
            MetricCategory::Accessibility => "Accessibility",
        }
    }

    /// Phrase patterns for this category, longest first so a range wins
    /// over the bare amount it contains.
    fn patterns(self) -> &'static [&'static str] {
        match self {
            MetricCategory::Service => &[
                "İçeride servis",
                "Dışarıda servis",
                "Paket servis",
                "Self servis",
                "Masa servisi",
                "Al-götür",
                "Teslimat",
                "Açık büfe",
                "Drive-through",
                "Dine-in",
                "Takeaway",
                "Takeout",
                "Delivery",
            ],
            MetricCategory::Price => &[
                r"₺\d+\s*[-–]\s*\d+",
                r"₺\d+\+?",
                "Kişi başı fiyat",
                "Uygun fiyat",
                "Orta fiyat",
                "Ucuz",
                "Pahalı",
                "Inexpensive",
                "Moderate",
                "Expensive",
            ],
            MetricCategory::Wait => &[
                "Beklemek gerekmiyor",
                "Kısa bekleme",
                "Uzun bekleme",
                r"\d+\s*dakika",
                r"\d+\s*min(?:ute)?s?\b",
                "No wait",
                "Anında",
                "Hemen",
            ],
            MetricCategory::Seating => &[
                "Kapalı yemek alanı",
                "Açık hava oturma alanı",
                "Indoor seating",
                "Outdoor seating",
                "İç mekan",
                "Dış mekan",
                "Teras",
                "Bahçe",
                "Balkon",
            ],
            MetricCategory::Parking => &[
                "Park yeri bulmak zor",
                "Park yeri bulmak kolay",
                "Yol kenarı park",
                "Otopark yok",
                "Otopark var",
                "Ücretsiz park",
                "Ücretli park",
                "Free parking",
                "Paid parking",
                "Street parking",
                "Vale",
            ],
            MetricCategory::Atmosphere => &[
                "Aile dostu",
                "Romantik",
                "Kalabalık",
                "Samimi",
                "Sessiz",
                "Canlı",
                "Rahat",
                "Lüks",
                "Casual",
                "Cozy",
                "Quiet",
            ],
            MetricCategory::Accessibility => &[
                "Tekerlekli sandalye",
                "Engelli erişimi",
                "Çocuk dostu",
                "Evcil hayvan",
                "Wheelchair accessible",
                "Kid-friendly",
            ],
        }
    }
}

impl std::fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Metric values found in a text, grouped by category in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricMatches {
    groups: Vec<(MetricCategory, Vec<String>)>,
}

impl MetricMatches {
    /// Total number of distinct values across categories.
    #[must_use]
    pub fn count(&self) -> usize {
        self.groups.iter().map(|(_, values)| values.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn values(&self, category: MetricCategory) -> &[String] {
        self.groups
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// Compose `"Category: v1, v2. Category: v."`, or an empty string when
    /// nothing was detected.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.groups.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = self
            .groups
            .iter()
            .map(|(category, values)| format!("{category}: {}", values.join(", ")))
            .collect();
        format!("{}.", parts.join(". "))
    }
}

static CATEGORY_PATTERNS: LazyLock<Vec<(MetricCategory, Vec<Regex>)>> = LazyLock::new(|| {
    MetricCategory::ALL
        .iter()
        .map(|&category| {
            let regexes = category
                .patterns()
                .iter()
                .map(|pattern| Regex::new(&bounded(pattern)).expect("valid regex"))
                .collect();
            (category, regexes)
        })
        .collect()
});

/// Case-insensitive pattern with word boundaries on whichever ends start or
/// finish with a letter.
fn bounded(pattern: &str) -> String {
    let prefix = if pattern.starts_with(char::is_alphabetic) {
        r"\b"
    } else {
        ""
    };
    let suffix = if pattern.ends_with(char::is_alphabetic) {
        r"\b"
    } else {
        ""
    };
    format!("(?i){prefix}{pattern}{suffix}")
}

/// Find metric phrases in `text`. Overlapping matches keep the first
/// (longest-pattern) hit; repeated values are reported once.
#[must_use]
pub fn detect_metrics(text: &str) -> MetricMatches {
    let mut taken: Vec<(usize, usize)> = Vec::new();
    let mut groups = Vec::new();

    for (category, regexes) in CATEGORY_PATTERNS.iter() {
        let mut values: Vec<String> = Vec::new();
        for regex in regexes {
            for m in regex.find_iter(text) {
                let overlaps = taken
                    .iter()
                    .any(|&(start, end)| m.start() < end && start < m.end());
                if overlaps {
                    continue;
                }
                taken.push((m.start(), m.end()));
                let value = m.as_str().trim().to_string();
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        if !values.is_empty() {
            groups.push((*category, values));
        }
    }

    MetricMatches { groups }
}

/// Whether a review consists mostly of structured metric fields.
///
/// True when the text (rating marker removed) is empty, when it has at most
/// [`METRIC_WORD_THRESHOLD`] words and two or more metric values, or when it
/// spans more than three lines of which at least 70% hold three words or
/// fewer.
#[must_use]
pub fn is_metric_only(text: &str) -> bool {
    let without_marker = strip_rating_marker(text);
    let body = without_marker.trim();
    if body.is_empty() {
        return true;
    }

    let word_count = body.split_whitespace().count();
    if word_count <= METRIC_WORD_THRESHOLD && detect_metrics(body).count() >= 2 {
        return true;
    }

    let lines: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let short_lines = lines
        .iter()
        .filter(|line| line.split_whitespace().count() <= 3)
        .count();
    // short_lines / lines >= 0.7 without float casts
    lines.len() > 3 && short_lines * 10 >= lines.len() * 7
}
