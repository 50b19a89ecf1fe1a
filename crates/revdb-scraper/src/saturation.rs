//! Incremental loading until a list stops growing.

use std::future::Future;

use crate::error::ScraperError;

/// Hard cap on steps, so a list that keeps growing cannot loop forever.
pub const MAX_SATURATION_STEPS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Saturation {
    /// Largest item count observed.
    pub count: usize,
    pub steps: u32,
    /// `true` when the step cap ended the loop instead of the idle limit.
    pub capped: bool,
}

/// Repeatedly runs `step`, which advances the list (scroll, click "more")
/// and returns the current item count.
///
/// A step that does not increase the count increments an idle counter; any
/// growth resets it. The loop ends after `idle_limit` consecutive idle steps.
///
/// # Errors
///
/// Propagates the first error returned by `step`.
pub async fn load_until_saturated<F, Fut>(
    idle_limit: u32,
    mut step: F,
) -> Result<Saturation, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<usize, ScraperError>>,
{
    let idle_limit = idle_limit.max(1);
    let mut count = 0usize;
    let mut idle = 0u32;
    let mut steps = 0u32;

    while idle < idle_limit {
        if steps >= MAX_SATURATION_STEPS {
            tracing::warn!(steps, count, "list still growing at step cap; stopping");
            return Ok(Saturation {
                count,
                steps,
                capped: true,
            });
        }

        let current = step().await?;
        steps += 1;
        if current > count {
            count = current;
            idle = 0;
        } else {
            idle += 1;
        }
        tracing::debug!(step = steps, count, idle, "load step");
    }

    Ok(Saturation {
        count,
        steps,
        capped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn stops_after_idle_limit_without_growth() {
        let outcome = load_until_saturated(5, || async { Ok(0) }).await.unwrap();
        assert_eq!(outcome.steps, 5);
        assert_eq!(outcome.count, 0);
        assert!(!outcome.capped);
    }

    #[tokio::test]
    async fn growth_resets_idle_counter() {
        let sequence = [10usize, 20, 20, 30, 30, 30];
        let calls = AtomicUsize::new(0);
        let outcome = load_until_saturated(3, || {
            let i = calls.fetch_add(1, Ordering::SeqCst);
            let value = sequence.get(i).copied().unwrap_or(30);
            async move { Ok(value) }
        })
        .await
        .unwrap();

        assert_eq!(outcome.count, 30);
        // 10, 20 grow; 20 idle; 30 grows; then three idle steps.
        assert_eq!(outcome.steps, 7);
    }

    #[tokio::test]
    async fn ever_growing_list_hits_step_cap() {
        let calls = AtomicUsize::new(0);
        let outcome = load_until_saturated(5, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok(n) }
        })
        .await
        .unwrap();

        assert!(outcome.capped);
        assert_eq!(outcome.steps, MAX_SATURATION_STEPS);
    }

    #[tokio::test]
    async fn step_error_is_propagated() {
        let result = load_until_saturated(5, || async {
            Err(ScraperError::WebDriver {
                error: "no such window".to_string(),
                message: "window closed".to_string(),
            })
        })
        .await;
        assert!(matches!(result, Err(ScraperError::WebDriver { .. })));
    }
}
