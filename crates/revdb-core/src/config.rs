use thiserror::Error;

use crate::app_config::{AppConfig, ClassifierKind, Environment};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_flag(&or_default(var, default)).ok_or_else(|| {
            invalid(
                var,
                "expected one of true/false/1/0/yes/no".to_string(),
            )
        })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("REVDB_ENV", "development"))
        .map_err(|reason| invalid("REVDB_ENV", reason))?;
    let log_level = or_default("REVDB_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("REVDB_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("REVDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("REVDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "REVDB_DB_MIN_CONNECTIONS",
            format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        ));
    }

    let webdriver_url = or_default("REVDB_WEBDRIVER_URL", "http://localhost:9515");
    let maps_base_url = or_default("REVDB_MAPS_BASE_URL", "https://www.google.com/maps");
    let driver_timeout_secs = parse_u64("REVDB_DRIVER_TIMEOUT_SECS", "60")?;
    let driver_max_retries = parse_u32("REVDB_DRIVER_MAX_RETRIES", "2")?;
    let driver_retry_backoff_base_secs = parse_u64("REVDB_DRIVER_RETRY_BACKOFF_BASE_SECS", "2")?;

    let scroll_pause_ms = parse_u64("REVDB_SCROLL_PAUSE_MS", "3000")?;
    let scroll_idle_limit = parse_u32("REVDB_SCROLL_IDLE_LIMIT", "5")?;
    if scroll_idle_limit == 0 {
        return Err(invalid(
            "REVDB_SCROLL_IDLE_LIMIT",
            "must be at least 1".to_string(),
        ));
    }
    let inter_business_delay_ms = parse_u64("REVDB_INTER_BUSINESS_DELAY_MS", "3000")?;
    // Production hosts have no display for a visible browser.
    let headless_default = if env == Environment::Production {
        "true"
    } else {
        "false"
    };
    let headless = parse_bool("REVDB_HEADLESS", headless_default)?;

    let classifier_url = lookup("REVDB_CLASSIFIER_URL")
        .ok()
        .filter(|url| !url.trim().is_empty());
    let classifier_kind = parse_classifier_kind(&or_default("REVDB_CLASSIFIER_KIND", "multilingual"))
        .map_err(|reason| invalid("REVDB_CLASSIFIER_KIND", reason))?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        webdriver_url,
        maps_base_url,
        driver_timeout_secs,
        driver_max_retries,
        driver_retry_backoff_base_secs,
        scroll_pause_ms,
        scroll_idle_limit,
        inter_business_delay_ms,
        headless,
        classifier_url,
        classifier_kind,
    })
}

fn parse_environment(s: &str) -> Result<Environment, String> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(format!(
            "unknown environment '{other}' (expected development, test, or production)"
        )),
    }
}

fn parse_classifier_kind(s: &str) -> Result<ClassifierKind, String> {
    match s {
        "multilingual" => Ok(ClassifierKind::Multilingual),
        "features" => Ok(ClassifierKind::Features),
        other => Err(format!(
            "unknown classifier kind '{other}' (expected multilingual or features)"
        )),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
