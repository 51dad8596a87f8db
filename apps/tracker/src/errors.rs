use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::models::TrackedJobId;

/// Every failure an operation against the Remote API can end in.
///
/// Nothing here is retried. Each store records `user_message()` in its error
/// state and hands the error back to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not signed in: authentication token is missing or expired")]
    MissingToken,

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Tracked job {0} is not loaded")]
    NotFound(TrackedJobId),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Could not read resume: {0}")]
    Resume(String),
}

/// Shape of a non-2xx body. Anything else is ignored.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// Builds the error for a non-2xx response, preferring the body's `error` field.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| b.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("server responded with status {}", status.as_u16()));
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }

    /// Human-readable message for the view. Transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => {
                "Network error: could not reach the server. Please try again.".to_string()
            }
            ApiError::Decode(_) => "The server sent a response that could not be read.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
