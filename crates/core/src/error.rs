//! Error types shared by every crate in the workspace

use thiserror::Error;

use crate::Language;

/// Result alias using the core [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by engines and loaders
#[derive(Error, Debug)]
pub enum Error {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(Language),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether retrying the same request against the same engine could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
