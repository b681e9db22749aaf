//! Script loading error types.

use thiserror::Error;

use crate::engine::EngineError;

/// Errors that can occur while fetching or parsing a script.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No server URL configured for remote scripts.
    #[error("SKRIPTOR_URL is not set in the environment variables or settings")]
    MissingServerUrl,

    /// The server does not know the script.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// The server answered with an unexpected status.
    #[error("Server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Network error.
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The document is not valid YAML.
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is YAML but not a valid script.
    #[error(transparent)]
    Shape(#[from] EngineError),
}
