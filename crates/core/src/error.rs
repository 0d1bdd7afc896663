//! Error types for the trellis workflow engine
//!
//! This module defines all caller-visible error outcomes. Every variant is a
//! distinct, stable contract: callers branch on them and the engine never
//! collapses one into another. We use `thiserror` for `Display` and `Error`
//! trait implementations.

use thiserror::Error;

/// Result type alias for trellis operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for content workflow operations
///
/// The engine never auto-retries: retry policy belongs to the caller.
/// Any variant raised inside a transaction aborts it fully; no partial
/// writes are ever committed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Malformed id, role, or field shape
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Item, parent, or shadow absent
    #[error("not found: {0}")]
    NotFound(String),

    /// The permission matrix rejected the operation
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The hierarchy is corrupted (no path to root, multiple parents,
    /// or a cycle). Never silently worked around.
    #[error("data integrity: {0}")]
    DataIntegrity(String),

    /// A move would create a hierarchy cycle
    #[error("circular move: {0}")]
    Circular(String),

    /// Incompatible existing pending state
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unexpected storage failure; the enclosing transaction is aborted
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Shorthand constructor for [`Error::InvalidInput`]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Shorthand constructor for [`Error::NotFound`]
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Shorthand constructor for [`Error::PermissionDenied`]
    pub fn denied(msg: impl Into<String>) -> Self {
        Error::PermissionDenied(msg.into())
    }

    /// Shorthand constructor for [`Error::DataIntegrity`]
    pub fn integrity(msg: impl Into<String>) -> Self {
        Error::DataIntegrity(msg.into())
    }

    /// True for errors that indicate a corrupted store rather than a bad request
    pub fn is_integrity(&self) -> bool {
        matches!(self, Error::DataIntegrity(_) | Error::Storage(_))
    }
}
