// Error types for the demo client.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing configuration value: {0}")]
    MissingConfig(String),

    #[error("Unknown auth scheme: {0} (expected `password` or `basic`)")]
    InvalidAuthScheme(String),

    #[error("No authentication token available")]
    NotAuthenticated,

    #[error("Authentication failed: {0}")]
    AuthRejected(u16),

    #[error("Authentication response did not contain a token")]
    MissingToken,

    #[error("Unsupported provider value: {0} (expected a string or a list of strings)")]
    InvalidProvider(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}
