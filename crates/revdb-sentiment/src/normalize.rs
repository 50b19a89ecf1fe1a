//! Cleanup passes for scraped review text.
//!
//! Each pass is a pure `&str -> String` function. [`normalize`] runs them in
//! order and repeats the whole pipeline until the text stops changing, so the
//! result is a fixpoint: `normalize(normalize(x)) == normalize(x)`.

use std::sync::LazyLock;

use regex::Regex;

/// A named text-cleanup step.
pub type Pass = fn(&str) -> String;

/// The cleanup pipeline, in application order.
pub const PASSES: &[(&str, Pass)] = &[
    ("private_use", strip_private_use),
    ("control", strip_control),
    ("ui_chrome", strip_ui_chrome),
    ("urls_and_html", strip_urls_and_html),
    ("metric_remnants", strip_empty_metric_remnants),
    ("punctuation", collapse_punctuation),
];

/// Upper bound on pipeline repetitions. Every pass only removes or collapses
/// characters, so the text converges long before this.
const MAX_ROUNDS: usize = 8;

/// UI labels that leak into scraped review text (English and Turkish
/// listing interfaces).
const UI_CHROME: &[&str] = &[
    "Like",
    "Share",
    "Reply",
    "Read more",
    "More",
    "Helpful",
    "Beğen",
    "Paylaş",
    "Yanıtla",
    "Daha fazla",
    "Devamını oku",
    "Yardımcı oldu",
];

static CHROME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = UI_CHROME
        .iter()
        .copied()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)^(?:{alternatives})(?:\s*\(?\d+\)?)?$")).expect("valid regex")
});

static CHROME_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",\s*\b(?:Like|Share|Reply|Beğen|Paylaş|Yanıtla)\b\s*,").expect("valid regex")
});

static DIGITS_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

static PUNCTUATION_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[,.\s]+$").expect("valid regex"));

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhttps?://[^\s<>]+").expect("valid regex"));

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]+>").expect("valid regex"));

static EMPTY_METRIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+:[ \t]*[,.][ \t]*").expect("valid regex"));

static ADJACENT_LABELS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+:[ \t]*(\b\w+:)").expect("valid regex"));

/// Headings of the structured metric section a listing attaches to reviews.
/// Only these count as a dangling label at the end of a text; any other
/// word before a final colon is prose.
const METRIC_LABELS: &[&str] = &[
    "hizmet",
    "fiyat",
    "bekleme",
    "bekleme süresi",
    "oturma",
    "ortam",
    "park",
    "otopark",
    "atmosfer",
    "erişim",
    "erişilebilirlik",
    "service",
    "price",
    "price per person",
    "wait",
    "wait time",
    "seating",
    "parking",
    "atmosphere",
    "accessibility",
];

static TRAILING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    let labels = METRIC_LABELS
        .iter()
        .copied()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)(?:^|[\s,.])((?:{labels}):\s*)\z")).expect("valid regex")
});

/// Ordered `(pattern, replacement)` pairs for punctuation and whitespace.
static PUNCTUATION_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"[ \t]+([,.])", "$1"),
        (r",\s*,", ","),
        (r":\s*,", ":"),
        (r",\s*\.", "."),
        (r"\.\s*\.", "."),
        (r"\.\s+,", "."),
        (r",\s*\[", " ["),
        (r"\.\s*\[", ". ["),
        (r"[ \t]+", " "),
        (r" ?\n ?", "\n"),
        (r"\n\s*\n", "\n"),
        (r"^[\s,.]+", ""),
        (r"[\s,]+$", ""),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid regex"), replacement))
    .collect()
});

/// Run every pass until the text reaches a fixpoint.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut current = run_passes(raw);
    for _ in 1..MAX_ROUNDS {
        let next = run_passes(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn run_passes(text: &str) -> String {
    PASSES
        .iter()
        .fold(text.to_string(), |acc, (_, pass)| pass(&acc))
}

/// Remove private-use-area codepoints (icon glyphs) and U+FFFD.
#[must_use]
pub fn strip_private_use(text: &str) -> String {
    text.chars()
        .filter(|c| !('\u{E000}'..='\u{F8FF}').contains(c) && *c != '\u{FFFD}')
        .collect()
}

/// Remove control characters except tab and newline.
#[must_use]
pub fn strip_control(text: &str) -> String {
    text.chars()
        .filter(|c| *c == '\t' || *c == '\n' || !c.is_control())
        .collect()
}

/// Drop lines that are pure UI chrome, digits, or punctuation, and scrub
/// chrome labels embedded between commas. Remaining lines are trimmed and
/// blank lines removed.
#[must_use]
pub fn strip_ui_chrome(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && !CHROME_LINE.is_match(line)
                && !DIGITS_ONLY.is_match(line)
                && !PUNCTUATION_ONLY.is_match(line)
        })
        .map(|line| CHROME_INLINE.replace_all(line, ",").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove URLs and HTML tags.
#[must_use]
pub fn strip_urls_and_html(text: &str) -> String {
    let without_urls = URL.replace_all(text, "");
    HTML_TAG.replace_all(&without_urls, "").into_owned()
}

/// Remove structured-metric labels left without a value, e.g.
/// `"Service: ."`, `"Service: Atmosphere:"`, or a metric heading such as
/// `"Fiyat:"` closing the text. A final colon after any other word is kept.
#[must_use]
pub fn strip_empty_metric_remnants(text: &str) -> String {
    let text = EMPTY_METRIC.replace_all(text, "");
    let text = ADJACENT_LABELS.replace_all(&text, "$1");
    let mut text = text.into_owned();
    if let Some(label) = TRAILING_LABEL.captures(&text).and_then(|c| c.get(1)) {
        text.truncate(label.start());
    }
    text
}

/// Collapse repeated punctuation, whitespace, and blank lines, then trim
/// stray leading and trailing punctuation.
#[must_use]
pub fn collapse_punctuation(text: &str) -> String {
    PUNCTUATION_RULES
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
        .trim()
        .to_string()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
