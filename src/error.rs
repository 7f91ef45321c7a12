// src/error.rs
//! Application error types with structured error handling.
//!
//! Each variant names one failure mode of the client: the user typed something
//! the form refuses, the network never answered, or the notes service answered
//! with a rejection. Read paths surface these as a list-level status message;
//! mutation paths log them and leave the UI untouched.

use crate::types::{FieldErrors, ValidationError};
use reqwest::StatusCode;
use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The request never produced an HTTP response.
    #[error("Network failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The notes service answered with a non-2xx status.
    #[error("Notes API returned an error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Field-scoped form rejections. Never reaches the network layer.
    #[error(transparent)]
    Form(#[from] FieldErrors),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AppError {
    /// HTTP status of a server rejection, if this error carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            AppError::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Whether the service reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Whether the service refused the bearer credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }

    /// Text shown to the user where a failed request is reported.
    pub fn display_message(&self) -> String {
        match self {
            AppError::Api { status, message } if message.trim().is_empty() => {
                format!("Request failed with status code {}", status.as_u16())
            }
            AppError::Api { message, .. } => message.clone(),
            AppError::Transport(_) => "Network Error".to_string(),
            other => other.to_string(),
        }
    }
}

// Allow converting from anyhow::Error, preserving the message
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError {
            message: err.to_string(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::InvalidConfiguration(format!("invalid URL: {}", err))
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;
