//! # AppError
//!
//! Centralized error handling for the yakboard engine.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all engine operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Post, Comment, Community). Expired ghost
    /// content answers with this same variant so callers cannot tell an
    /// expired post apart from one that never existed.
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., vote value outside {-1, +1}, malformed
    /// location, non-positive radius, content too long)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Security/Auth failure (e.g., anonymous write, banned author,
    /// deleting someone else's post)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., duplicate community membership)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., store unavailable)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wraps an adapter-level failure. Ports speak `anyhow`; the engine
    /// speaks `AppError`.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::Internal(err.to_string())
    }

    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(kind.to_string(), id.to_string())
    }
}

/// A specialized Result type for yakboard logic.
pub type Result<T> = std::result::Result<T, AppError>;
