//! Offline unit tests for revdb-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use revdb_core::{AppConfig, ClassifierKind, Environment, QueueStatus};
use revdb_db::{CommentRow, DbError, PendingBusinessRow, PoolConfig};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        webdriver_url: "http://localhost:9515".to_string(),
        maps_base_url: "https://www.google.com/maps".to_string(),
        driver_timeout_secs: 60,
        driver_max_retries: 2,
        driver_retry_backoff_base_secs: 2,
        scroll_pause_ms: 3000,
        scroll_idle_limit: 5,
        inter_business_delay_ms: 3000,
        headless: false,
        classifier_url: None,
        classifier_kind: ClassifierKind::Multilingual,
    }
}

fn pending_row(status: &str, error_message: Option<&str>) -> PendingBusinessRow {
    PendingBusinessRow {
        id: 11,
        business_type: "pharmacy".to_string(),
        city: "springfield".to_string(),
        district: "downtown".to_string(),
        business_name: "ACME Pharmacy".to_string(),
        status: status.to_string(),
        created_at: Utc::now(),
        processed_at: None,
        error_message: error_message.map(str::to_string),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn pending_row_maps_to_queue_status() {
    assert_eq!(
        pending_row("pending", None).queue_status().unwrap(),
        QueueStatus::Pending
    );
    assert_eq!(
        pending_row("failed", Some("timeout")).queue_status().unwrap(),
        QueueStatus::Failed("timeout".to_string())
    );
}

#[test]
fn pending_row_with_unknown_status_is_invalid() {
    let err = pending_row("archived", None).queue_status().unwrap_err();
    assert!(
        matches!(err, DbError::InvalidRow { id: 11, .. }),
        "unexpected error: {err:?}"
    );
}

#[test]
fn comment_row_rating_conversion() {
    let mut row = CommentRow {
        id: 3,
        business_id: 1,
        username: "alice".to_string(),
        rating: Some(4),
        date: None,
        comment_text: "nice".to_string(),
        likes: 0,
        sentiment: None,
        sentiment_score: None,
    };
    assert_eq!(row.rating().unwrap().map(revdb_core::Rating::get), Some(4));

    row.rating = None;
    assert_eq!(row.rating().unwrap(), None);

    row.rating = Some(9);
    assert!(matches!(row.rating(), Err(DbError::InvalidRow { id: 3, .. })));
}
