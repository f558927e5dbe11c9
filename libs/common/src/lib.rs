//! Common library for the Abrora client core
//!
//! This crate provides shared functionality used across the client core
//! crates: the store-facing error taxonomy, hosted-backend configuration,
//! the identity channel, and the optimistic-update rollback helper.

pub mod config;
pub mod error;
pub mod identity;
pub mod optimistic;
