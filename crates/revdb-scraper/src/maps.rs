//! [`ReviewSource`] backed by a WebDriver-controlled browser on the maps
//! listing site.
//!
//! Browser-side scripts only gather candidate values; field resolution
//! happens in [`crate::fragment`]. Each script starts with a `// revdb:<name>`
//! marker line.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use revdb_core::{AppConfig, ReviewFragment};

use crate::error::ScraperError;
use crate::fragment::RawReview;
use crate::saturation::load_until_saturated;
use crate::source::{dedup_preserving_order, ReviewSource};
use crate::webdriver::WebDriverClient;

/// "More" buttons clicked per review scroll step.
pub const MORE_BUTTONS_PER_STEP: u32 = 20;

/// Rounds of "read more" expansion before giving up.
pub const EXPAND_ROUNDS: u32 = 5;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

const CONSENT_SCRIPT: &str = r"// revdb:consent
const patterns = [/tümünü kabul/i, /kabul/i, /accept/i, /agree/i];
const buttons = Array.from(document.querySelectorAll('button'));
for (const pattern of patterns) {
  const button = buttons.find(b => pattern.test(b.innerText || ''));
  if (button) { button.click(); return true; }
}
return false;";

const REVIEWS_TAB_SCRIPT: &str = r"// revdb:reviews-tab
const matches = s => /yorumlar|reviews/i.test(s || '');
const tab = Array.from(document.querySelectorAll('button')).find(b =>
  matches(b.getAttribute('aria-label')) ||
  Array.from(b.querySelectorAll('span')).some(s => matches(s.innerText)));
if (!tab) return false;
tab.click();
return true;";

const RESULT_NAMES_SCRIPT: &str = r#"// revdb:result-names
const selectors = ['div.Nv2PK', "div[role='article']", "a[href*='/maps/place/']"];
for (const selector of selectors) {
  const cards = Array.from(document.querySelectorAll(selector));
  if (cards.length === 0) continue;
  return cards.map(card => {
    const name = card.querySelector('div.qBF1Pd, h3, span.OSrXXb') || card.querySelector('a span');
    return ((name && name.innerText) || card.getAttribute('aria-label') || '').trim();
  });
}
return [];"#;

const CLICK_RESULT_SCRIPT: &str = r#"// revdb:click-result
const index = arguments[0];
const selectors = ['div.Nv2PK', "div[role='article']", "a[href*='/maps/place/']"];
for (const selector of selectors) {
  const cards = Array.from(document.querySelectorAll(selector));
  if (cards.length === 0) continue;
  const card = cards[index];
  if (!card) return false;
  const link = card.tagName === 'A' ? card : (card.querySelector('a') || card);
  link.click();
  return true;
}
return false;"#;

const RESULTS_STEP_SCRIPT: &str = r#"// revdb:results-step
const count = document.querySelectorAll('div.Nv2PK').length;
const container = document.querySelector("div[role='feed']") ||
  document.querySelector('div.m6QErb.DxyBCb') || document.querySelector('div.m6QErb');
if (container) container.scrollTop = container.scrollHeight;
return count;"#;

const REVIEWS_STEP_SCRIPT: &str = r#"// revdb:reviews-step
const limit = arguments[0];
for (const b of Array.from(document.querySelectorAll('button.w8nwRe.kyuRq')).slice(0, limit)) {
  try { b.click(); } catch (e) {}
}
const selectors = ['div.jftiEf', "div[aria-label*='yorum']", "div[aria-label*='review']", 'div.MyEned', 'div.ODSEW'];
let count = 0;
for (const s of selectors) {
  count = document.querySelectorAll(s).length;
  if (count > 0) break;
}
let el = document.querySelector('div.jftiEf') || document.querySelector('div.fontBodyMedium');
while (el && el !== document.body) {
  const st = window.getComputedStyle(el);
  if ((st.overflowY === 'auto' || st.overflowY === 'scroll') && el.scrollHeight > el.clientHeight) break;
  el = el.parentElement;
}
const container = (el && el !== document.body) ? el : (document.scrollingElement || document.body);
container.scrollTop = container.scrollHeight;
return count;"#;

const EXPAND_SCRIPT: &str = r"// revdb:expand
const buttons = Array.from(document.querySelectorAll('button.w8nwRe'))
  .filter(b => /devamını oku|daha fazla|more/i.test(b.innerText || ''));
let clicked = 0;
for (const b of buttons) {
  try { b.click(); clicked++; } catch (e) {}
}
return clicked;";

const EXTRACT_SCRIPT: &str = r#"// revdb:extract
const reviewSelectors = ['div.jftiEf', "div[aria-label*='yorum']", "div[aria-label*='review']", 'div.MyEned', 'div.ODSEW'];
let elements = [];
for (const s of reviewSelectors) {
  elements = Array.from(document.querySelectorAll(s));
  if (elements.length) break;
}
const texts = (root, selectors) => selectors.flatMap(s => {
  const e = root.querySelector(s);
  return e ? [(e.innerText || '').trim()] : [];
});
const labels = (root, selector) =>
  Array.from(root.querySelectorAll(selector)).map(e => e.getAttribute('aria-label') || '');
return elements.map(el => ({
  usernames: texts(el, ['div.d4r55', 'span.d4r55', 'a.d4r55', 'div.fontBodySmall', 'span.fontBodySmall', "a[href*='/maps/contrib/']"]),
  rating_labels: labels(el, "[aria-label*='yıldız'], [aria-label*='star'], [aria-label*='★']"),
  star_icons: el.querySelectorAll('span.hCCjke span').length || null,
  dates: Array.from(el.querySelectorAll('span, div'))
    .filter(e => e.children.length === 0)
    .map(e => (e.innerText || '').trim())
    .filter(Boolean)
    .concat(labels(el, "[aria-label*='önce'], [aria-label*='gün']")),
  texts: texts(el, ['span.wiI7pd', 'div.wiI7pd', 'span.fontBodyMedium', 'div.fontBodyMedium',
    "span[jsaction*='pane.review.text']", "div[jsaction*='pane.review.text']"]),
  full_text: el.innerText || '',
  like_labels: labels(el, "[aria-label*='Beğenildi'], [aria-label*='liked']"),
}));"#;

/// Timing and target settings for [`MapsSource`].
#[derive(Debug, Clone)]
pub struct MapsOptions {
    pub base_url: String,
    pub headless: bool,
    /// Pause after each scroll step before the next count.
    pub scroll_pause: Duration,
    /// Pause after navigation and clicks that load a new view.
    pub page_settle: Duration,
    /// How long to poll for the reviews tab right after a search.
    pub reviews_wait: Duration,
    /// How long to poll for the reviews tab after clicking a result card.
    pub reviews_retry_wait: Duration,
}

impl MapsOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig, headless: bool) -> Self {
        let scroll_pause = Duration::from_millis(config.scroll_pause_ms);
        Self {
            base_url: config.maps_base_url.clone(),
            headless,
            scroll_pause,
            page_settle: scroll_pause * 2,
            reviews_wait: Duration::from_secs(5),
            reviews_retry_wait: Duration::from_secs(15),
        }
    }
}

/// One browser session on the maps site.
#[derive(Debug)]
pub struct MapsSource {
    driver: WebDriverClient,
    session_id: String,
    options: MapsOptions,
}

impl MapsSource {
    /// Opens a new browser session.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the WebDriver session cannot be created.
    pub async fn connect(driver: WebDriverClient, options: MapsOptions) -> Result<Self, ScraperError> {
        let session_id = driver.new_session(options.headless).await?;
        tracing::info!(session = %session_id, headless = options.headless, "browser session started");
        Ok(Self {
            driver,
            session_id,
            options,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search/{}",
            self.options.base_url.trim_end_matches('/'),
            utf8_percent_encode(query.trim(), NON_ALPHANUMERIC)
        )
    }

    async fn run(&self, script: &str, args: Vec<Value>) -> Result<Value, ScraperError> {
        self.driver.execute(&self.session_id, script, args).await
    }

    async fn run_as<T: DeserializeOwned>(
        &self,
        script: &'static str,
        args: Vec<Value>,
    ) -> Result<T, ScraperError> {
        let value = self.run(script, args).await?;
        serde_json::from_value(value).map_err(|source| ScraperError::Deserialize {
            context: format!("script result ({})", script_name(script)),
            source,
        })
    }

    /// Navigates to the search page for `query`, accepting a consent dialog
    /// if one is shown.
    async fn open_search(&self, query: &str) -> Result<(), ScraperError> {
        let url = self.search_url(query);
        tracing::debug!(%url, "opening search page");
        self.driver.navigate(&self.session_id, &url).await?;
        tokio::time::sleep(self.options.page_settle).await;

        if self.run_as::<bool>(CONSENT_SCRIPT, vec![]).await? {
            tracing::info!("consent dialog accepted");
            tokio::time::sleep(self.options.page_settle).await;
            self.driver.navigate(&self.session_id, &url).await?;
            tokio::time::sleep(self.options.page_settle).await;
        }
        Ok(())
    }

    /// Polls for the reviews tab and clicks it. Always tries at least once.
    async fn open_reviews_tab(&self, wait: Duration) -> Result<bool, ScraperError> {
        let deadline = Instant::now() + wait;
        loop {
            if self.run_as::<bool>(REVIEWS_TAB_SCRIPT, vec![]).await? {
                tokio::time::sleep(self.options.page_settle).await;
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn result_names(&self) -> Result<Vec<String>, ScraperError> {
        self.run_as(RESULT_NAMES_SCRIPT, vec![]).await
    }
}

#[async_trait]
impl ReviewSource for MapsSource {
    async fn discover_businesses(
        &self,
        query: &str,
        idle_limit: u32,
    ) -> Result<Vec<String>, ScraperError> {
        self.open_search(query).await?;

        let saturation = load_until_saturated(idle_limit, move || async move {
            let count = self.run_as::<usize>(RESULTS_STEP_SCRIPT, vec![]).await?;
            tokio::time::sleep(self.options.scroll_pause).await;
            Ok(count)
        })
        .await?;
        tracing::info!(
            cards = saturation.count,
            steps = saturation.steps,
            "result list loaded"
        );

        Ok(dedup_preserving_order(self.result_names().await?))
    }

    async fn search(&self, query: &str, business_name: &str) -> Result<bool, ScraperError> {
        self.open_search(query).await?;

        // A single match opens the business page directly.
        if self.open_reviews_tab(self.options.reviews_wait).await? {
            return Ok(true);
        }

        let mut index = match_business(&self.result_names().await?, business_name);
        if index.is_none() {
            tokio::time::sleep(self.options.page_settle).await;
            index = match_business(&self.result_names().await?, business_name);
        }
        let Some(index) = index else {
            tracing::warn!(business = business_name, "business not in search results");
            return Ok(false);
        };

        if !self.run_as::<bool>(CLICK_RESULT_SCRIPT, vec![json!(index)]).await? {
            return Ok(false);
        }
        tokio::time::sleep(self.options.page_settle).await;
        self.open_reviews_tab(self.options.reviews_retry_wait).await
    }

    async fn load_all_reviews(&self, idle_limit: u32) -> Result<usize, ScraperError> {
        let saturation = load_until_saturated(idle_limit, move || async move {
            let count = self
                .run_as::<usize>(REVIEWS_STEP_SCRIPT, vec![json!(MORE_BUTTONS_PER_STEP)])
                .await?;
            tokio::time::sleep(self.options.scroll_pause).await;
            Ok(count)
        })
        .await?;
        tracing::info!(
            reviews = saturation.count,
            steps = saturation.steps,
            capped = saturation.capped,
            "reviews loaded"
        );
        Ok(saturation.count)
    }

    async fn expand_truncated_text(&self) -> Result<usize, ScraperError> {
        let pause = self.options.scroll_pause.min(Duration::from_secs(1));
        let mut expanded = 0usize;
        for _ in 0..EXPAND_ROUNDS {
            let clicked = self.run_as::<usize>(EXPAND_SCRIPT, vec![]).await?;
            if clicked == 0 {
                break;
            }
            expanded += clicked;
            tokio::time::sleep(pause).await;
        }
        tracing::debug!(expanded, "truncated reviews expanded");
        Ok(expanded)
    }

    async fn extract_raw_reviews(&self) -> Result<Vec<ReviewFragment>, ScraperError> {
        let raw: Vec<RawReview> = self.run_as(EXTRACT_SCRIPT, vec![]).await?;
        Ok(raw.iter().map(RawReview::resolve).collect())
    }

    async fn close(&self) -> Result<(), ScraperError> {
        self.driver.delete_session(&self.session_id).await?;
        tracing::info!(session = %self.session_id, "browser session closed");
        Ok(())
    }
}

/// Index of the result card naming `target`: an exact case-insensitive match
/// wins, otherwise the first card whose name contains or is contained in it.
#[must_use]
pub fn match_business(names: &[String], target: &str) -> Option<usize> {
    let target = target.trim().to_lowercase();
    if target.is_empty() {
        return None;
    }
    let lowered: Vec<String> = names.iter().map(|n| n.trim().to_lowercase()).collect();

    lowered.iter().position(|n| *n == target).or_else(|| {
        lowered
            .iter()
            .position(|n| !n.is_empty() && (n.contains(&target) || target.contains(n.as_str())))
    })
}

fn script_name(script: &str) -> &str {
    script
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("// revdb:"))
        .unwrap_or("anonymous")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn exact_match_beats_containment() {
        let results = names(&["ACME Pharmacy Annex", "acme pharmacy"]);
        assert_eq!(match_business(&results, "ACME Pharmacy"), Some(1));
    }

    #[test]
    fn containment_matches_either_direction() {
        let results = names(&["City Drugs Downtown"]);
        assert_eq!(match_business(&results, "city drugs"), Some(0));

        let results = names(&["", "Drugs"]);
        assert_eq!(match_business(&results, "City Drugs"), Some(1));
    }

    #[test]
    fn no_match_returns_none() {
        let results = names(&["Corner Cafe"]);
        assert_eq!(match_business(&results, "City Drugs"), None);
        assert_eq!(match_business(&results, "  "), None);
    }

    #[test]
    fn every_script_carries_a_marker() {
        for script in [
            CONSENT_SCRIPT,
            REVIEWS_TAB_SCRIPT,
            RESULT_NAMES_SCRIPT,
            CLICK_RESULT_SCRIPT,
            RESULTS_STEP_SCRIPT,
            REVIEWS_STEP_SCRIPT,
            EXPAND_SCRIPT,
            EXTRACT_SCRIPT,
        ] {
            assert_ne!(script_name(script), "anonymous");
        }
    }
}
