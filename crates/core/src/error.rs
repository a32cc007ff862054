//! Domain error model for the foundation types.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error for foundation primitives.
///
/// Keep this focused on deterministic validation failures; module-specific
/// taxonomies (chart, journal) live in the accounting crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Minor-unit arithmetic overflowed `i64`.
    #[error("amount overflow")]
    AmountOverflow,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
