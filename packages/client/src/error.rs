//! Error types for the Kaiwa chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure; the runner answers with a reconnect
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Outbound frame could not be encoded
    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
