//! Lexicon-driven aspect scoring for Turkish restaurant reviews.
//!
//! Independent of the ML classifier: each category has positive and negative
//! keyword lists, matched as substrings against the lowercased text and its
//! diacritic-folded form. Scores run from 1 to 10.

use revdb_core::Rating;

/// One review aspect and its keyword lists.
#[derive(Debug)]
pub struct Aspect {
    pub key: &'static str,
    pub name: &'static str,
    /// Emoji shown before the name in reports.
    pub icon: &'static str,
    pub positive: &'static [&'static str],
    pub negative: &'static [&'static str],
}

pub const ASPECTS: &[Aspect] = &[
    Aspect {
        key: "food_quality",
        name: "Yemek Kalitesi",
        icon: "🍽️",
        positive: &[
            "lezzetli", "lezzet", "nefis", "muhteşem", "harika", "güzel yemek", "taze", "enfes",
            "mükemmel tat", "başarılı", "tat", "damak", "leziz", "yemekler güzel",
            "yemekleri güzel", "doyurucu", "porsiyon büyük", "porsiyon dolu", "kaliteli",
            "özenli", "ev yapımı", "geleneksel", "otantik",
        ],
        negative: &[
            "lezzetsiz", "tatsız", "bayat", "soğuk yemek", "kötü yemek", "berbat", "yavan",
            "tuzlu", "tuzsuz", "yanık", "çiğ", "porsiyon küçük", "yetersiz", "kalitesiz", "bozuk",
            "kokmuş", "eski", "donmuş",
        ],
    },
    Aspect {
        key: "staff_attitude",
        name: "Personel Tutumu",
        icon: "👥",
        positive: &[
            "ilgili", "güler yüzlü", "nazik", "kibar", "yardımcı", "personel harika", "çalışan",
            "garson", "saygılı", "profesyonel", "sıcakkanlı", "samimi", "anlayışlı", "ilgi",
            "alakalı", "hizmet güzel", "personel güzel", "çalışanlar güzel",
        ],
        negative: &[
            "ilgisiz", "kaba", "saygısız", "umursamaz", "soğuk", "personel kötü", "garson kötü",
            "hizmet kötü", "alakasız", "küstah", "sinirli", "sert", "kayıtsız", "yüzsüz",
        ],
    },
    Aspect {
        key: "price",
        name: "Fiyat",
        icon: "💰",
        positive: &[
            "uygun fiyat", "ucuz", "hesaplı", "ekonomik", "makul", "fiyat uygun", "fiyatı uygun",
            "fiyatına göre", "değer", "bütçe dostu", "cüzdan dostu", "fiyat performans",
        ],
        negative: &[
            "pahalı", "fahiş", "kazık", "aşırı fiyat", "fiyat yüksek", "değmez", "para tuzağı",
            "fiyatına değmez", "çok pahalı", "hesap yüksek", "fiyat/performans kötü",
        ],
    },
    Aspect {
        key: "cleanliness",
        name: "Temizlik",
        icon: "🧹",
        positive: &[
            "temiz", "hijyenik", "tertemiz", "pırıl pırıl", "bakımlı", "düzenli", "steril",
            "hijyen", "temizlik güzel",
        ],
        negative: &[
            "pis", "kirli", "hijyensiz", "bakımsız", "dağınık", "kir", "leş", "iğrenç",
            "temiz değil", "berbat ortam",
        ],
    },
    Aspect {
        key: "service_speed",
        name: "Hizmet Hızı",
        icon: "⏱️",
        positive: &[
            "hızlı", "çabuk", "anında", "bekletmedi", "hemen geldi", "süratli", "dakik",
            "zamanında", "gecikmesiz",
        ],
        negative: &[
            "yavaş", "geç", "beklettiler", "uzun sürdü", "gecikmeli", "bekledik", "yarım saat",
            "bir saat", "çok bekledik", "sipariş geç", "servis yavaş",
        ],
    },
    Aspect {
        key: "atmosphere",
        name: "Atmosfer",
        icon: "🏠",
        positive: &[
            "ortam güzel", "ambiyans", "dekor", "şık", "ferah", "rahat", "huzurlu", "keyifli",
            "romantik", "samimi ortam", "müzik güzel", "manzara", "dekorasyon", "tasarım",
        ],
        negative: &[
            "gürültülü", "kalabalık", "bunaltıcı", "sıkışık", "karanlık", "kasvetli",
            "soğuk ortam", "rahatsız", "dar", "havasız", "müzik kötü", "gürültü", "ses",
        ],
    },
    Aspect {
        key: "location",
        name: "Konum/Ulaşım",
        icon: "📍",
        positive: &[
            "merkezi", "kolay ulaşım", "park var", "otopark", "konumu güzel", "ulaşım kolay",
            "merkez", "bulunabilir", "erişilebilir",
        ],
        negative: &[
            "park yok", "otopark yok", "ulaşım zor", "uzak", "köşe bucak", "zor bulunur",
            "park sorunu", "konum kötü",
        ],
    },
];

/// Words that amplify sentiment; the strongest one present wins.
pub const INTENSIFIERS: &[(&str, f64)] = &[
    ("çok", 1.3),
    ("aşırı", 1.4),
    ("son derece", 1.5),
    ("oldukça", 1.2),
    ("gayet", 1.1),
    ("bayağı", 1.2),
    ("gerçekten", 1.3),
    ("kesinlikle", 1.4),
    ("muhteşem", 1.5),
    ("harika", 1.4),
];

/// Any of these anywhere in the text swaps positive and negative hit counts.
pub const NEGATIONS: &[&str] = &["değil", "yok", "olmadı", "yoktu", "olmuyor", "olmaz", "hiç"];

/// Number of matched keywords kept per aspect.
const KEYWORDS_KEPT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Polarity {
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Polarity::Positive => "✅",
            Polarity::Negative => "❌",
            Polarity::Neutral => "➖",
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarity::Positive => write!(f, "positive"),
            Polarity::Negative => write!(f, "negative"),
            Polarity::Neutral => write!(f, "neutral"),
        }
    }
}

/// Score for one mentioned aspect.
#[derive(Debug, Clone, PartialEq)]
pub struct AspectScore {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub polarity: Polarity,
    /// 1.0–10.0, one decimal.
    pub score: f64,
    /// Up to three matched keywords, positive hits first.
    pub keywords: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AspectReport {
    pub rating: Option<Rating>,
    /// Only aspects the text mentions, in [`ASPECTS`] order.
    pub aspects: Vec<AspectScore>,
}

impl AspectReport {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AspectScore> {
        self.aspects.iter().find(|a| a.key == key)
    }
}

/// Lowercase with Turkish dotted/dotless i rules.
#[must_use]
pub fn turkish_lowercase(text: &str) -> String {
    text.chars()
        .flat_map(|c| match c {
            'I' => vec!['ı'],
            'İ' => vec!['i'],
            other => other.to_lowercase().collect(),
        })
        .collect()
}

/// Fold Turkish letters to their ASCII base letters.
#[must_use]
pub fn fold_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ğ' => 'g',
            'Ğ' => 'G',
            'ü' => 'u',
            'Ü' => 'U',
            'ş' => 's',
            'Ş' => 'S',
            'ı' => 'i',
            'İ' => 'I',
            'ö' => 'o',
            'Ö' => 'O',
            'ç' => 'c',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// Lowercase, replace punctuation with spaces, and collapse whitespace.
fn prepare(text: &str) -> String {
    let spaced: String = turkish_lowercase(text)
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Score every aspect mentioned in `text`, optionally blended with the
/// review's star rating.
#[must_use]
pub fn analyze(text: &str, rating: Option<Rating>) -> AspectReport {
    let lower = prepare(text);
    let folded = fold_diacritics(&lower);

    let mentions = |keyword: &str| {
        let keyword = turkish_lowercase(keyword);
        lower.contains(&keyword) || folded.contains(&fold_diacritics(&keyword))
    };

    let negated = NEGATIONS.iter().any(|word| lower.contains(word));
    let intensity = INTENSIFIERS
        .iter()
        .filter(|(word, _)| lower.contains(word))
        .map(|&(_, weight)| weight)
        .fold(1.0_f64, f64::max);

    let mut aspects = Vec::new();
    for aspect in ASPECTS {
        let positive: Vec<&'static str> =
            aspect.positive.iter().copied().filter(|k| mentions(k)).collect();
        let negative: Vec<&'static str> =
            aspect.negative.iter().copied().filter(|k| mentions(k)).collect();
        if positive.is_empty() && negative.is_empty() {
            continue;
        }

        let (mut pos, mut neg) = (positive.len(), negative.len());
        if negated {
            std::mem::swap(&mut pos, &mut neg);
        }

        let (polarity, score) = match pos.cmp(&neg) {
            std::cmp::Ordering::Greater => {
                let base = 7.0 + f64::from(hits(pos));
                (Polarity::Positive, (base * intensity).min(10.0))
            }
            std::cmp::Ordering::Less => {
                let base = 4.0 - f64::from(hits(neg));
                (Polarity::Negative, (base / intensity).max(1.0))
            }
            std::cmp::Ordering::Equal => (Polarity::Neutral, 5.0),
        };
        let mut score = round1(score);

        if let Some(rating) = rating {
            let factor = f64::from(rating.get()) / 5.0;
            score = match polarity {
                Polarity::Positive => (score * (0.7 + 0.3 * factor)).min(10.0),
                Polarity::Negative => (score * (1.3 - 0.3 * factor)).max(1.0),
                Polarity::Neutral => score,
            };
            score = round1(score.clamp(1.0, 10.0));
        }

        let keywords = positive
            .iter()
            .chain(negative.iter())
            .copied()
            .take(KEYWORDS_KEPT)
            .collect();

        aspects.push(AspectScore {
            key: aspect.key,
            name: aspect.name,
            icon: aspect.icon,
            polarity,
            score,
            keywords,
        });
    }

    AspectReport { rating, aspects }
}

/// Hit count capped at three, as a small integer for score arithmetic.
fn hits(count: usize) -> u8 {
    u8::try_from(count.min(3)).unwrap_or(3)
}

/// Human-readable report: one line per aspect with a 10-cell bar.
#[must_use]
pub fn format_report(report: &AspectReport) -> String {
    let mut lines = Vec::new();
    if let Some(rating) = report.rating {
        lines.push(format!("Rating: {}", "★".repeat(usize::from(rating.get()))));
    }
    lines.push(format!("Aspects detected: {}", report.aspects.len()));
    if report.aspects.is_empty() {
        lines.push("  (no aspect detected)".to_string());
    }
    for aspect in &report.aspects {
        let filled = filled_cells(aspect.score);
        lines.push(format!(
            "  {} {}: {:.1}/10 [{}{}] {}",
            aspect.icon,
            aspect.name,
            aspect.score,
            "█".repeat(filled),
            "░".repeat(10 - filled),
            aspect.polarity.marker()
        ));
        lines.push(format!("     keywords: {}", aspect.keywords.join(", ")));
    }
    lines.join("\n")
}

fn filled_cells(score: f64) -> usize {
    // score is clamped to 1..=10, so the truncating cast stays in range
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cells = score.clamp(0.0, 10.0).floor() as usize;
    cells
}

#[cfg(test)]
#[path = "aspect_test.rs"]
mod tests;
