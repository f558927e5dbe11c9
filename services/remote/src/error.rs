//! Custom error types for the remote adapter

use common::error::StoreError;
use thiserror::Error;

/// Error type for hosted-backend operations
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("Backend rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape
    #[error("Failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A write that should return the created row returned none
    #[error("Backend returned no row for a create")]
    MissingRow,
}

/// Type alias for Result with RemoteError
pub type RemoteResult<T> = Result<T, RemoteError>;

impl From<RemoteError> for StoreError {
    fn from(err: RemoteError) -> Self {
        StoreError::Backend(err.to_string())
    }
}
