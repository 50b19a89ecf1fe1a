use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::review::{Rating, ReviewRecord};

/// Dedup key of a review within one business.
///
/// The listing site exposes no stable review id, so identity is the content
/// triple. Two genuinely distinct reviews by the same user with the same
/// rating and text collapse into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub username: String,
    pub rating: Option<Rating>,
    pub text: String,
}

impl Signature {
    #[must_use]
    pub fn new(username: &str, rating: Option<Rating>, text: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            rating,
            text: text.trim().to_string(),
        }
    }

    #[must_use]
    pub fn of(record: &ReviewRecord) -> Self {
        Self::new(&record.username, record.rating, &record.text)
    }

    /// Hex SHA-256 of the triple, stored alongside each comment.
    #[must_use]
    pub fn digest(&self) -> String {
        let rating = self.rating.map_or_else(String::new, |r| r.to_string());
        let digest = Sha256::new()
            .chain_update(self.username.as_bytes())
            .chain_update([0x1f])
            .chain_update(rating.as_bytes())
            .chain_update([0x1f])
            .chain_update(self.text.as_bytes())
            .finalize();
        format!("{digest:x}")
    }
}

/// Signatures already known for a business, keyed by digest.
#[derive(Debug, Clone, Default)]
pub struct SignatureSet {
    digests: HashSet<String>,
}

impl SignatureSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_digests<I>(digests: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            digests: digests.into_iter().collect(),
        }
    }

    /// Adds a signature. Returns `false` if it was already present.
    pub fn insert(&mut self, signature: &Signature) -> bool {
        self.digests.insert(signature.digest())
    }

    #[must_use]
    pub fn is_duplicate(&self, signature: &Signature) -> bool {
        self.digests.contains(&signature.digest())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Keeps only records whose signature is unseen, recording each kept
    /// signature so repeats inside `records` are dropped too.
    pub fn retain_new(&mut self, records: Vec<ReviewRecord>) -> Vec<ReviewRecord> {
        records
            .into_iter()
            .filter(|record| self.insert(&Signature::of(record)))
            .collect()
    }
}
