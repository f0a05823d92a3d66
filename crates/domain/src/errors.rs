//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for FloorLink
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum FloorLinkError {
    /// Construction-time verification against the sites endpoint failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The API answered with `success=false`; carries the envelope's error
    /// text together with the verb and endpoint that produced it.
    #[error("Request error: {0}")]
    Request(String),

    /// Caller-supplied data violated a precondition before any request was
    /// sent (e.g. a reporting interval that ends before it starts).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A datetime value could not be normalized by any parsing strategy.
    #[error("Format error: {0}")]
    Format(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not a valid JSON envelope.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type alias for FloorLink operations
pub type Result<T> = std::result::Result<T, FloorLinkError>;
