use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Lifecycle of a discovered business in the collection queue.
///
/// ```text
/// (none) -> Pending -> Processing -> Completed
///                          |
///                          +------> Failed(message) -> Pending (explicit retry)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueStatus {
    Pending,
    Processing,
    Completed,
    Failed(String),
}

impl QueueStatus {
    pub const PENDING: &'static str = "pending";
    pub const PROCESSING: &'static str = "processing";
    pub const COMPLETED: &'static str = "completed";
    pub const FAILED: &'static str = "failed";

    /// The value stored in the `status` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => Self::PENDING,
            QueueStatus::Processing => Self::PROCESSING,
            QueueStatus::Completed => Self::COMPLETED,
            QueueStatus::Failed(_) => Self::FAILED,
        }
    }

    /// Rebuilds a status from the `status` and `error_message` columns.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownQueueStatus`] for values outside the four
    /// known states.
    pub fn from_row(status: &str, error_message: Option<String>) -> Result<Self, CoreError> {
        match status {
            Self::PENDING => Ok(QueueStatus::Pending),
            Self::PROCESSING => Ok(QueueStatus::Processing),
            Self::COMPLETED => Ok(QueueStatus::Completed),
            Self::FAILED => Ok(QueueStatus::Failed(error_message.unwrap_or_default())),
            other => Err(CoreError::UnknownQueueStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed() -> QueueStatus {
        QueueStatus::Failed("timeout".to_string())
    }

    #[test]
    fn round_trips_through_row_values() {
        for status in [
            QueueStatus::Pending,
            QueueStatus::Processing,
            QueueStatus::Completed,
        ] {
            let rebuilt = QueueStatus::from_row(status.as_str(), None).unwrap();
            assert_eq!(rebuilt, status);
        }
        let rebuilt = QueueStatus::from_row("failed", Some("timeout".to_string())).unwrap();
        assert_eq!(rebuilt, failed());
    }

    #[test]
    fn unknown_status_is_an_error() {
        let err = QueueStatus::from_row("done", None).unwrap_err();
        assert!(matches!(err, CoreError::UnknownQueueStatus(ref s) if s == "done"));
    }
}
