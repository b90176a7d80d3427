// src/infra/errors.rs — Error types for TaskSphere

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // Authorization (token cleared, user sent back to login)
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Not signed in. Run `tasksphere login` first.")]
    NotAuthenticated,

    // Backend rejected the request
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    // Transport
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The view that issued the request was torn down before it resolved.
    #[error("Request cancelled")]
    Cancelled,

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// The backend-supplied human-readable message, if the backend sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } | ApiError::Status { message, .. } => {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    /// Backend message when available, otherwise `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        self.detail()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}
