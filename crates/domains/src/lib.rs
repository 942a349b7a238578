//! # domains
//!
//! The central domain models, port traits, and error taxonomy for the
//! yakboard feed engine. Everything else in the workspace depends on
//! this crate and nothing here depends on an adapter.

pub mod error;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
