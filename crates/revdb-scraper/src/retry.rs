//! Retry with exponential back-off and jitter for WebDriver commands.
//!
//! Only transport-level failures are retried. Protocol errors reported by the
//! driver (missing elements, stale references, script errors) describe page
//! state and are returned immediately so the caller can fail the business.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ScraperError::Http`] on timeout or connection failure.
/// - [`ScraperError::UnexpectedStatus`] with a 5xx status and no protocol body.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::Deserialize { .. }
        | ScraperError::WebDriver { .. }
        | ScraperError::MalformedResponse { .. }
        | ScraperError::BusinessNotFound { .. }
        | ScraperError::ReviewsUnavailable { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// The wait before retry `n` is `backoff_base_secs * 2^(n-1)` seconds with
/// ±25 % jitter, capped at 60 s. With `max_retries = 2` the operation is
/// attempted at most 3 times. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;

                let computed = backoff_base_secs
                    .saturating_mul(1000)
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient webdriver error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn server_error() -> ScraperError {
        ScraperError::UnexpectedStatus {
            status: 502,
            url: "http://localhost:9515/session".to_owned(),
        }
    }

    /// Runs `retry_with_backoff` with zero backoff over a scripted sequence
    /// of outcomes; returns the result and the number of attempts made.
    async fn run_script(
        max_retries: u32,
        script: impl Fn(u32) -> Result<u32, ScraperError>,
    ) -> (Result<u32, ScraperError>, u32) {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(max_retries, 0, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            let outcome = script(n);
            async move { outcome }
        })
        .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let (result, calls) = run_script(3, |_| Ok(42)).await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn retries_server_errors_then_succeeds() {
        let (result, calls) =
            run_script(3, |n| if n < 2 { Err(server_error()) } else { Ok(99) }).await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let (result, calls) = run_script(2, |_| Err(server_error())).await;
        assert_eq!(calls, 3);
        assert!(matches!(
            result,
            Err(ScraperError::UnexpectedStatus { status: 502, .. })
        ));
    }

    #[tokio::test]
    async fn stale_element_is_not_retried() {
        let (result, calls) = run_script(3, |_| {
            Err(ScraperError::WebDriver {
                error: "stale element reference".to_owned(),
                message: "element is not attached".to_owned(),
            })
        })
        .await;
        assert_eq!(calls, 1);
        assert_eq!(
            result.unwrap_err().webdriver_code(),
            Some("stale element reference")
        );
    }

    #[tokio::test]
    async fn missing_business_is_not_retried() {
        let (result, calls) = run_script(3, |_| {
            Err(ScraperError::BusinessNotFound {
                name: "ACME Pharmacy".to_owned(),
            })
        })
        .await;
        assert_eq!(calls, 1);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let (_, calls) = run_script(3, |_| {
            Err(ScraperError::UnexpectedStatus {
                status: 404,
                url: "http://localhost:9515/session/x/url".to_owned(),
            })
        })
        .await;
        assert_eq!(calls, 1);
    }
}
