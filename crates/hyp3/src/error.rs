//! Error types for the HyP3 subscriptions API client.

use thiserror::Error;

/// Errors that can occur when talking to the HyP3 API.
#[derive(Debug, Error)]
pub enum Hyp3Error {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status.
    #[error("HyP3 API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Earthdata session could not be established.
    #[error("Earthdata authentication failed: {0}")]
    Auth(String),

    /// Response body did not match the expected shape.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
