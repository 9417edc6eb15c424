//! TechStore core: transport-agnostic instance identity, catalog records, and
//! the shared error type.
//!
//! This crate carries no HTTP or runtime dependencies so the identity provider
//! can be embedded by any handler layer.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Fallible paths surface as `TechStoreError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod catalog;
pub mod error;
pub mod identity;

/// Shared result type.
pub use error::{Result, TechStoreError};
pub use identity::{IdentityProvider, InstanceIdentity};
