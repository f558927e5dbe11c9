//! Custom error types for the client core
//!
//! This module defines the error taxonomy surfaced by the stores and
//! services. Every variant renders to a human-readable message for the
//! UI layer; there are no structured error codes.

use thiserror::Error;
use uuid::Uuid;

/// Error type for store and service operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// A mutating operation was attempted with no signed-in user
    #[error("Not signed in")]
    AuthRequired,

    /// Input was rejected before any remote call was made
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The remote backend rejected or failed an operation
    #[error("Backend error: {0}")]
    Backend(String),

    /// The referenced entity is not present in the store
    #[error("Unknown {0}: {1}")]
    NotFound(&'static str, Uuid),
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
