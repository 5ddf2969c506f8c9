//! Error types for the transport module.

use std::path::PathBuf;
use thiserror::Error;

use crate::job::UserId;

/// Errors that can occur while moving files or messages to and from users.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The input does not exist at its location.
    #[error("Input not found: {location}")]
    NotFound { location: String },

    /// The location is malformed or points outside the allowed area.
    #[error("Invalid input location {location}: {reason}")]
    InvalidLocation { location: String, reason: String },

    /// Copying the input into the job workspace failed.
    #[error("Failed to fetch {location}")]
    FetchFailed {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// Handing the output to the user failed.
    #[error("Failed to deliver {path} to user {user_id}")]
    DeliveryFailed {
        user_id: UserId,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sending a text message failed.
    #[error("Failed to notify user {user_id}: {reason}")]
    NotifyFailed { user_id: UserId, reason: String },
}

impl TransportError {
    pub fn invalid_location(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLocation {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn notify_failed(user_id: UserId, reason: impl Into<String>) -> Self {
        Self::NotifyFailed {
            user_id,
            reason: reason.into(),
        }
    }
}
