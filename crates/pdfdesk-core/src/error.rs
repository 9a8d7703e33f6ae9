//! Error types module
//!
//! `ClientError` covers every failure talking to a collaborator (backend API,
//! object storage, identity provider) and `UploadError` covers the local
//! refusals of the upload pipeline. Neither is ever fatal to the process.

use std::io;

use serde::Deserialize;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejections reported by a collaborator
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Identity provider error ({code}): {message}")]
    Identity { code: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Message suitable for showing to the user as-is.
    ///
    /// Collaborator-supplied messages are passed through verbatim; local
    /// failures fall back to the `Display` text.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status { message, .. } => message.clone(),
            ClientError::Identity { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            ClientError::InvalidInput(_) => LogLevel::Debug,
            ClientError::Status { .. }
            | ClientError::Unauthorized(_)
            | ClientError::Identity { .. }
            | ClientError::Timeout => LogLevel::Warn,
            ClientError::Network(_)
            | ClientError::InvalidResponse(_)
            | ClientError::Config(_)
            | ClientError::Io(_) => LogLevel::Error,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(format!("JSON parsing error: {}", err))
    }
}

/// Local refusals of the upload pipeline. None of these reach the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Please select a valid PDF file.")]
    InvalidSelection { media_type: Option<String> },

    #[error("No file selected")]
    NoFileSelected,

    #[error("An upload is already in progress")]
    InProgress,
}

/// Error payload returned by the backend.
///
/// Django REST framework reports failures under `detail`; the application
/// views use `error`, and informational replies use `message`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Parse a response body. Anything that is not a JSON object of strings
    /// yields an empty body so callers fall back to their generic message.
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }

    /// `detail`, then `error`, then `fallback`.
    pub fn detail_or(&self, fallback: &str) -> String {
        non_empty(&self.detail)
            .or_else(|| non_empty(&self.error))
            .unwrap_or(fallback)
            .to_string()
    }

    /// `error`, then `detail`, then `fallback`.
    pub fn error_or(&self, fallback: &str) -> String {
        non_empty(&self.error)
            .or_else(|| non_empty(&self.detail))
            .unwrap_or(fallback)
            .to_string()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
