use async_trait::async_trait;

use revdb_core::ReviewFragment;

use crate::error::ScraperError;

/// The page-automation collaborator behind discovery and collection.
///
/// Calls are stateful and sequential: `search` opens a business, and the
/// following `load_all_reviews`, `expand_truncated_text` and
/// `extract_raw_reviews` operate on that business's review list.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Enumerates business names listed for `query`, loading results until no
    /// new names appear for `idle_limit` consecutive attempts. Names are
    /// de-duplicated and keep first-seen order.
    async fn discover_businesses(
        &self,
        query: &str,
        idle_limit: u32,
    ) -> Result<Vec<String>, ScraperError>;

    /// Opens the review surface of `business_name`. Returns `false` when the
    /// business or its reviews cannot be found.
    async fn search(&self, query: &str, business_name: &str) -> Result<bool, ScraperError>;

    /// Loads reviews until saturation; returns the number loaded.
    async fn load_all_reviews(&self, idle_limit: u32) -> Result<usize, ScraperError>;

    /// Reveals truncated review bodies; returns the number expanded.
    async fn expand_truncated_text(&self) -> Result<usize, ScraperError>;

    async fn extract_raw_reviews(&self) -> Result<Vec<ReviewFragment>, ScraperError>;

    /// Releases the underlying browser session.
    async fn close(&self) -> Result<(), ScraperError> {
        Ok(())
    }
}

/// Removes repeated and blank names, keeping first-seen order.
#[must_use]
pub fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && seen.insert(n.clone()))
        .collect()
}
