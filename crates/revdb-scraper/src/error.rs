use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// An error object returned by the WebDriver endpoint, such as
    /// `no such element` or `stale element reference`.
    #[error("webdriver error '{error}': {message}")]
    WebDriver { error: String, message: String },

    #[error("webdriver response for {context} is missing {field}")]
    MalformedResponse {
        context: &'static str,
        field: &'static str,
    },

    #[error("business \"{name}\" not found in search results")]
    BusinessNotFound { name: String },

    #[error("reviews could not be opened for \"{name}\"")]
    ReviewsUnavailable { name: String },
}

impl ScraperError {
    /// The WebDriver error code, when this is a protocol error.
    #[must_use]
    pub fn webdriver_code(&self) -> Option<&str> {
        match self {
            ScraperError::WebDriver { error, .. } => Some(error),
            _ => None,
        }
    }
}
