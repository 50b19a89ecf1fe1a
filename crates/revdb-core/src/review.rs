use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Star rating on the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(v @ 1..=5) => Ok(Rating(v)),
            _ => Err(CoreError::InvalidRating(value)),
        }
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        i64::from(rating.0)
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One review as yielded by the scraping collaborator. Every field is
/// optional because the page markup is unreliable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFragment {
    pub username: Option<String>,
    pub rating: Option<u8>,
    pub date: Option<String>,
    pub text: Option<String>,
    pub likes: Option<u32>,
}

/// A parsed review ready for dedup and persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub username: String,
    pub rating: Option<Rating>,
    pub date: Option<String>,
    pub text: String,
    pub likes: u32,
}

impl ReviewFragment {
    /// Converts the fragment into a record.
    ///
    /// Returns `None` when no username can be resolved; such fragments are
    /// unparseable rather than errors. Out-of-range ratings are dropped to
    /// `None`.
    #[must_use]
    pub fn into_record(self) -> Option<ReviewRecord> {
        let username = self
            .username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())?;

        Some(ReviewRecord {
            username,
            rating: self
                .rating
                .and_then(|r| Rating::try_from(i64::from(r)).ok()),
            date: self
                .date
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            text: self.text.map(|t| t.trim().to_string()).unwrap_or_default(),
            likes: self.likes.unwrap_or(0),
        })
    }
}
