use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by companion operations.
///
/// Every variant is terminal for the operation that produced it; nothing is
/// retried and no transcript state is rolled back.
#[derive(Debug, Error)]
pub enum CompanionError {
    /// User-supplied JSON could not be parsed.
    #[error("Invalid JSON input: {0}")]
    Parse(#[source] serde_json::Error),

    /// A required field was empty after trimming.
    #[error("Please enter a {field}")]
    Validation { field: &'static str },

    /// The service answered with a non-success status.
    #[error("{operation} failed with status {status}")]
    Status {
        operation: &'static str,
        status: reqwest::StatusCode,
    },

    /// The request never completed or the body could not be decoded.
    #[error("{operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The task running the request stopped before producing an answer.
    #[error("{operation} was interrupted")]
    Interrupted { operation: &'static str },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to access config file {path}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file {path} is not valid JSON")]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CompanionError {
    /// True for failures of the HTTP exchange itself (status, transport or
    /// an interrupted request task).
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Self::Status { .. } | Self::Transport { .. } | Self::Interrupted { .. }
        )
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, CompanionError>;
