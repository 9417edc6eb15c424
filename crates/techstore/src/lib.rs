//! Top-level facade crate for TechStore.
//!
//! Re-exports core types and the API library so users can depend on a single crate.

pub mod core {
    pub use techstore_core::*;
}

pub mod api {
    pub use techstore_api::*;
}
