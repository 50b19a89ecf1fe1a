pub mod app_config;
pub mod config;
pub mod query;
pub mod queue;
pub mod review;
pub mod signature;

pub use app_config::{AppConfig, ClassifierKind, Environment, IngestConfig};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use query::DiscoveryQuery;
pub use queue::QueueStatus;
pub use review::{Rating, ReviewFragment, ReviewRecord};
pub use signature::{Signature, SignatureSet};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid discovery query '{0}': expected '<business type> <city> <district>'")]
    InvalidQuery(String),

    #[error("rating out of range: {0} (expected 1-5)")]
    InvalidRating(i64),

    #[error("unknown queue status: {0}")]
    UnknownQueueStatus(String),
}
