//! Checklist client state and orchestration
//!
//! [`store::ChecklistStore`] caches the signed-in user's checklists and the
//! template catalog together with the transient UI filter state.
//! [`service::ChecklistService`] bridges the store to the remote backend and
//! the identity channel: fetch on sign-in, optimistic mutations with
//! rollback, and the status/progress consistency rule.

pub mod backend;
pub mod service;
pub mod store;

pub use backend::ChecklistBackend;
pub use service::ChecklistService;
pub use store::ChecklistStore;
