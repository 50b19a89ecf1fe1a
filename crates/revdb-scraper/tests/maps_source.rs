//! Integration tests for `MapsSource` against a stubbed WebDriver endpoint.
//!
//! Each browser script begins with a `// revdb:<name>` marker, which the
//! mocks match on to return canned script results.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use revdb_scraper::{MapsOptions, MapsSource, ReviewSource, ScraperError, WebDriverClient};

const EXECUTE_PATH: &str = "/session/s1/execute/sync";

fn options(server: &MockServer) -> MapsOptions {
    MapsOptions {
        base_url: format!("{}/maps", server.uri()),
        headless: true,
        scroll_pause: Duration::ZERO,
        page_settle: Duration::ZERO,
        reviews_wait: Duration::ZERO,
        reviews_retry_wait: Duration::ZERO,
    }
}

/// Mounts session creation and navigation, then connects a source.
async fn connect(server: &MockServer) -> MapsSource {
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": { "sessionId": "s1", "capabilities": {} }
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/session/s1/url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .mount(server)
        .await;

    let driver = WebDriverClient::new(&server.uri(), 5, 0, 0).expect("client");
    MapsSource::connect(driver, options(server))
        .await
        .expect("connect")
}

fn script(name: &str, result: Value) -> Mock {
    Mock::given(method("POST"))
        .and(path(EXECUTE_PATH))
        .and(body_string_contains(format!("revdb:{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": result })))
}

#[tokio::test]
async fn search_url_percent_encodes_query() {
    let server = MockServer::start().await;
    let source = connect(&server).await;
    assert_eq!(
        source.search_url("City Drugs springfield downtown"),
        format!(
            "{}/maps/search/City%20Drugs%20springfield%20downtown",
            server.uri()
        )
    );
}

#[tokio::test]
async fn discover_scrolls_until_idle_and_dedups_names() {
    let server = MockServer::start().await;
    let source = connect(&server).await;

    script("consent", json!(false)).mount(&server).await;
    // Constant count: one growing step, then three idle steps.
    script("results-step", json!(4))
        .expect(4)
        .mount(&server)
        .await;
    script(
        "result-names",
        json!(["ACME Pharmacy", "City Drugs", "ACME Pharmacy", ""]),
    )
    .mount(&server)
    .await;

    let names = source
        .discover_businesses("pharmacy springfield downtown", 3)
        .await
        .unwrap();
    assert_eq!(names, ["ACME Pharmacy", "City Drugs"]);
}

#[tokio::test]
async fn search_opens_reviews_directly_for_single_result() {
    let server = MockServer::start().await;
    let source = connect(&server).await;

    script("consent", json!(false)).mount(&server).await;
    script("reviews-tab", json!(true)).mount(&server).await;
    script("click-result", json!(true))
        .expect(0)
        .mount(&server)
        .await;

    assert!(source
        .search("ACME Pharmacy springfield downtown", "ACME Pharmacy")
        .await
        .unwrap());
}

#[tokio::test]
async fn search_falls_back_to_matching_result_card() {
    let server = MockServer::start().await;
    let source = connect(&server).await;

    script("consent", json!(false)).mount(&server).await;
    script("reviews-tab", json!(false))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    script("reviews-tab", json!(true)).mount(&server).await;
    script("result-names", json!(["Corner Cafe", "City Drugs Downtown"]))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(EXECUTE_PATH))
        .and(body_string_contains("revdb:click-result"))
        .and(body_string_contains("\"args\":[1]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": true })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(source
        .search("City Drugs springfield downtown", "City Drugs")
        .await
        .unwrap());
}

#[tokio::test]
async fn search_reports_missing_business() {
    let server = MockServer::start().await;
    let source = connect(&server).await;

    script("consent", json!(false)).mount(&server).await;
    script("reviews-tab", json!(false)).mount(&server).await;
    script("result-names", json!(["Corner Cafe"]))
        .mount(&server)
        .await;
    script("click-result", json!(true))
        .expect(0)
        .mount(&server)
        .await;

    assert!(!source
        .search("City Drugs springfield downtown", "City Drugs")
        .await
        .unwrap());
}

#[tokio::test]
async fn load_all_reviews_returns_saturated_count() {
    let server = MockServer::start().await;
    let source = connect(&server).await;

    script("reviews-step", json!(12))
        .expect(3)
        .mount(&server)
        .await;

    assert_eq!(source.load_all_reviews(2).await.unwrap(), 12);
}

#[tokio::test]
async fn expansion_is_capped_at_five_rounds() {
    let server = MockServer::start().await;
    let source = connect(&server).await;

    script("expand", json!(3)).expect(5).mount(&server).await;

    assert_eq!(source.expand_truncated_text().await.unwrap(), 15);
}

#[tokio::test]
async fn expansion_stops_when_nothing_is_left() {
    let server = MockServer::start().await;
    let source = connect(&server).await;

    script("expand", json!(0)).expect(1).mount(&server).await;

    assert_eq!(source.expand_truncated_text().await.unwrap(), 0);
}

#[tokio::test]
async fn extract_resolves_candidate_lists() {
    let server = MockServer::start().await;
    let source = connect(&server).await;

    script(
        "extract",
        json!([
            {
                "usernames": ["", "Ayşe K."],
                "rating_labels": ["5 yıldız"],
                "star_icons": null,
                "dates": ["Yerel Rehber", "2 hafta önce"],
                "texts": ["Yemekler çok lezzetliydi, tekrar geleceğiz"],
                "full_text": "Ayşe K.\n2 hafta önce\nYemekler çok lezzetliydi, tekrar geleceğiz",
                "like_labels": ["Beğenildi 3"]
            },
            {
                "usernames": [],
                "rating_labels": [],
                "star_icons": 4,
                "dates": [],
                "texts": [],
                "full_text": "",
                "like_labels": []
            }
        ]),
    )
    .mount(&server)
    .await;

    let fragments = source.extract_raw_reviews().await.unwrap();
    assert_eq!(fragments.len(), 2);

    let first = &fragments[0];
    assert_eq!(first.username.as_deref(), Some("Ayşe K."));
    assert_eq!(first.rating, Some(5));
    assert_eq!(first.date.as_deref(), Some("2 hafta önce"));
    assert_eq!(
        first.text.as_deref(),
        Some("Yemekler çok lezzetliydi, tekrar geleceğiz")
    );
    assert_eq!(first.likes, Some(3));

    // No username: the collection stage discards it.
    assert!(fragments[1].username.is_none());
    assert_eq!(fragments[1].rating, Some(4));
}

#[tokio::test]
async fn stale_element_during_extract_is_an_error() {
    let server = MockServer::start().await;
    let source = connect(&server).await;

    Mock::given(method("POST"))
        .and(path(EXECUTE_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "value": {
                "error": "stale element reference",
                "message": "element is not attached to the page document"
            }
        })))
        .mount(&server)
        .await;

    let err = source.extract_raw_reviews().await.unwrap_err();
    assert!(
        matches!(err, ScraperError::WebDriver { ref error, .. } if error == "stale element reference"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn close_deletes_session() {
    let server = MockServer::start().await;
    let source = connect(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/session/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;

    source.close().await.unwrap();
}
