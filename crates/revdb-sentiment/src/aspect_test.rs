use super::*;

fn stars(n: u8) -> Option<Rating> {
    Some(Rating::try_from(i64::from(n)).unwrap())
}

#[test]
fn intensified_food_praise_caps_at_ten() {
    let report = analyze("Yemekler çok lezzetliydi", None);
    assert_eq!(report.aspects.len(), 1);
    let food = report.get("food_quality").unwrap();
    assert_eq!(food.polarity, Polarity::Positive);
    assert!((food.score - 10.0).abs() < f64::EPSILON);
    assert_eq!(food.keywords, ["lezzetli", "lezzet"]);
}

#[test]
fn negation_flips_polarity() {
    let report = analyze("Yemekler lezzetli değil", None);
    let food = report.get("food_quality").unwrap();
    assert_eq!(food.polarity, Polarity::Negative);
    assert!((food.score - 2.0).abs() < f64::EPSILON);
}

#[test]
fn unrelated_text_mentions_nothing() {
    assert!(analyze("Merhaba", None).aspects.is_empty());
    assert!(analyze("", None).aspects.is_empty());
}

#[test]
fn ascii_spelling_matches_through_folding() {
    let report = analyze("Servis cok hizli", None);
    let speed = report.get("service_speed").unwrap();
    assert_eq!(speed.polarity, Polarity::Positive);
    assert!((speed.score - 8.0).abs() < f64::EPSILON);
}

#[test]
fn dotted_capital_i_lowercases_the_turkish_way() {
    assert_eq!(turkish_lowercase("LEZZETLİ IŞIK"), "lezzetli ışık");
    let report = analyze("YEMEKLER LEZZETLİ", None);
    assert!(report.get("food_quality").is_some());
}

#[test]
fn equal_hits_are_neutral() {
    let report = analyze("taze ama bayat", None);
    let food = report.get("food_quality").unwrap();
    assert_eq!(food.polarity, Polarity::Neutral);
    assert!((food.score - 5.0).abs() < f64::EPSILON);
}

#[test]
fn low_rating_pulls_positive_scores_down() {
    let report = analyze("Temiz bir yer", stars(1));
    let clean = report.get("cleanliness").unwrap();
    assert!((clean.score - 6.1).abs() < 1e-9, "got {}", clean.score);
}

#[test]
fn rating_blend_on_negative_scores() {
    let top = analyze("Çok pis", stars(5));
    assert!((top.get("cleanliness").unwrap().score - 2.3).abs() < 1e-9);

    let bottom = analyze("Çok pis", stars(1));
    assert!((bottom.get("cleanliness").unwrap().score - 2.9).abs() < 1e-9);
}

#[test]
fn at_most_three_keywords_are_kept() {
    let report = analyze("lezzetli taze nefis enfes", None);
    assert_eq!(
        report.get("food_quality").unwrap().keywords,
        ["lezzetli", "lezzet", "nefis"]
    );
}

#[test]
fn scores_stay_in_range() {
    for text in [
        "son derece berbat bayat tatsız yavan kokmuş",
        "muhteşem harika nefis enfes taze leziz",
        "kaba ilgisiz personel kötü hiç değil",
    ] {
        for rating in [None, stars(1), stars(5)] {
            for aspect in analyze(text, rating).aspects {
                assert!(
                    (1.0..=10.0).contains(&aspect.score),
                    "{text:?} {rating:?} gave {}",
                    aspect.score
                );
            }
        }
    }
}

#[test]
fn report_renders_bar_and_marker() {
    let rendered = format_report(&analyze("Yemekler çok lezzetliydi", stars(5)));
    assert!(rendered.contains("Rating: ★★★★★"), "{rendered}");
    assert!(
        rendered.contains("  🍽️ Yemek Kalitesi: 10.0/10 [██████████] ✅"),
        "{rendered}"
    );
    assert!(rendered.contains("keywords: lezzetli, lezzet"), "{rendered}");
}

#[test]
fn every_aspect_has_an_icon_in_its_report_line() {
    for aspect in ASPECTS {
        assert!(!aspect.icon.is_empty(), "{}", aspect.key);
    }
    let rendered = format_report(&analyze("Fiyatlar çok pahalı ve garson kaba", None));
    assert!(rendered.contains("💰 Fiyat:"), "{rendered}");
    assert!(rendered.contains("👥 Personel Tutumu:"), "{rendered}");
}

#[test]
fn empty_report_says_so() {
    let rendered = format_report(&analyze("Merhaba", None));
    assert!(rendered.contains("Aspects detected: 0"));
    assert!(rendered.contains("no aspect detected"));
}
