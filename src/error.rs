//! Error handling and custom error types
//!
//! Provides unified error handling across the service using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Environment file error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("OpenAI API error: {0}")]
    AiProvider(String),

    /// Non-success response whose body carried a provider error message.
    #[error("OpenAI API error (status {status}): {message}")]
    ProviderRejected { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generic error: {0}")]
    Generic(String),
}

impl Error {
    /// Message suitable for returning to a browser client.
    ///
    /// Prefers the provider's own error message, then this error's display
    /// text, then `fallback`. Transport errors always use `fallback` since
    /// their text carries the provider URL.
    pub fn client_message(&self, fallback: &str) -> String {
        let message = match self {
            Error::ProviderRejected { message, .. } => message.trim().to_string(),
            Error::Http(_) => return fallback.to_string(),
            other => other.to_string(),
        };

        if message.is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
