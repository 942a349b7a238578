//! # storage-adapters
//!
//! Implementations of the domain ports. The in-memory adapter is always
//! compiled and backs unit/integration tests and single-node demo runs;
//! the Postgres adapter is feature-gated behind `db-postgres`.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;

#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
