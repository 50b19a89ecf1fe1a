//! Minimal W3C WebDriver client.
//!
//! Only the commands the maps source needs are implemented: session
//! creation and deletion, navigation, and synchronous script execution.
//! Every response carries a `value` member; failures carry
//! `{"value": {"error": ..., "message": ...}}`.

use std::time::Duration;

use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;

const CHROME_ARGS: &[&str] = &[
    "--lang=tr-TR",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--window-size=1920,1080",
    "--disable-blink-features=AutomationControlled",
];

#[derive(Debug, Deserialize)]
struct WireResponse {
    value: Value,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

/// HTTP client for a WebDriver endpoint such as `chromedriver`.
///
/// Transport failures (timeouts, connection errors, bare 5xx responses) are
/// retried with exponential backoff up to `max_retries` additional attempts.
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl WebDriverClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Starts a Chrome session and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MalformedResponse`] if the response has no
    /// `sessionId`, or any transport/protocol error.
    pub async fn new_session(&self, headless: bool) -> Result<String, ScraperError> {
        let mut args: Vec<&str> = CHROME_ARGS.to_vec();
        if headless {
            args.push("--headless=new");
        }
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        });

        let value = self.command(Method::POST, "/session", Some(body)).await?;
        value
            .get("sessionId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ScraperError::MalformedResponse {
                context: "new session",
                field: "sessionId",
            })
    }

    /// # Errors
    ///
    /// Returns any transport or protocol error.
    pub async fn navigate(&self, session_id: &str, url: &str) -> Result<(), ScraperError> {
        self.command(
            Method::POST,
            &format!("/session/{session_id}/url"),
            Some(json!({ "url": url })),
        )
        .await?;
        Ok(())
    }

    /// Runs `script` in the page and returns its JSON result.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::WebDriver`] for script errors, or any transport
    /// error.
    pub async fn execute(
        &self,
        session_id: &str,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, ScraperError> {
        self.command(
            Method::POST,
            &format!("/session/{session_id}/execute/sync"),
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns any transport or protocol error.
    pub async fn delete_session(&self, session_id: &str) -> Result<(), ScraperError> {
        self.command(Method::DELETE, &format!("/session/{session_id}"), None)
            .await?;
        Ok(())
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ScraperError> {
        let url = format!("{}{path}", self.base_url);

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let method = method.clone();
            let body = body.clone();
            async move {
                let mut request = self.client.request(method, &url);
                if let Some(body) = &body {
                    request = request.json(body);
                }

                let response = request.send().await?;
                let status = response.status();
                let text = response.text().await?;

                match serde_json::from_str::<WireResponse>(&text) {
                    Ok(wire) if status.is_success() => Ok(wire.value),
                    Ok(wire) => match serde_json::from_value::<WireError>(wire.value) {
                        Ok(err) => Err(ScraperError::WebDriver {
                            error: err.error,
                            message: err.message,
                        }),
                        Err(_) => Err(ScraperError::UnexpectedStatus {
                            status: status.as_u16(),
                            url,
                        }),
                    },
                    Err(_) if !status.is_success() => Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    }),
                    Err(source) => Err(ScraperError::Deserialize {
                        context: format!("webdriver response from {url}"),
                        source,
                    }),
                }
            }
        })
        .await
    }
}
