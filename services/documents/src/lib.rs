//! Document client state and orchestration
//!
//! [`store::DocumentStore`] caches the signed-in user's document metadata
//! together with the upload/preview UI state. [`service::DocumentService`]
//! bridges the store to the remote backend: fetch on sign-in, optimistic
//! update/delete with rollback, and the upload flow with its simulated
//! progress reporting.

pub mod backend;
pub mod service;
pub mod store;

pub use backend::DocumentBackend;
pub use service::DocumentService;
pub use store::DocumentStore;
