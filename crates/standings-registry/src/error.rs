//! Error types for the registry.

use thiserror::Error;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in registry operations.
///
/// None of these are transient: the registry does no I/O, so retrying with
/// the same input always fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The lower score bound is above the upper one.
    #[error("invalid score range: min {min} is greater than max {max}")]
    InvalidRange { min: i32, max: i32 },

    /// The registry has not been seeded yet.
    #[error("registry is empty: seed has not completed")]
    EmptyRegistry,

    /// Seed was called on a registry that already holds entries.
    #[error("registry has already been seeded")]
    AlreadySeeded,

    /// The same key was supplied twice while building a registry.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// An internal consistency check failed.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Reject ranges whose bounds are inverted.
pub(crate) fn check_range(min: i32, max: i32) -> Result<()> {
    if min > max {
        return Err(Error::InvalidRange { min, max });
    }
    Ok(())
}
