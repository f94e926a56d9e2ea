//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// uniqueness, missing records). Storage concerns belong to the store error.
///
/// Every variant carries the operator-facing message verbatim; `message()`
/// returns it without the category prefix used by `Display`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. non-positive quantity, malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A uniqueness rule was violated (e.g. duplicate item name).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// The bare, operator-facing message.
    pub fn message(&self) -> &str {
        match self {
            DomainError::Validation(msg)
            | DomainError::Conflict(msg)
            | DomainError::NotFound(msg)
            | DomainError::InvalidId(msg) => msg,
        }
    }
}
