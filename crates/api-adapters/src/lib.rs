//! # api-adapters
//!
//! The HTTP boundary over the engine (feature `web-axum`). This layer
//! owns what the engine deliberately does not: identifying the caller,
//! rejecting anonymous or banned writers, and mapping the error
//! taxonomy onto status codes. Every engine call receives the viewer
//! location and clock explicitly; nothing ambient crosses this line.

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(feature = "web-axum")]
pub use state::{build_router, AppState};
