use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A free-text discovery query split into its business type and location.
///
/// The last two whitespace-delimited tokens are the city and district; every
/// token before them forms the business type, so multi-word types such as
/// `"coffee shop istanbul kadikoy"` are supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryQuery {
    pub business_type: String,
    pub city: String,
    pub district: String,
    /// The query as typed, whitespace-normalized. Sent to the listing site.
    pub raw: String,
}

impl DiscoveryQuery {
    /// Parses `"<business type> <city> <district>"`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidQuery`] when fewer than three tokens are
    /// present.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(CoreError::InvalidQuery(input.trim().to_string()));
        }

        let split = tokens.len() - 2;
        Ok(Self {
            business_type: tokens[..split].join(" "),
            city: tokens[split].to_string(),
            district: tokens[split + 1].to_string(),
            raw: tokens.join(" "),
        })
    }
}

impl std::fmt::Display for DiscoveryQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
