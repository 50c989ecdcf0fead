//! Error types for the grouping engine.
//!
//! Only contract violations surface here. Degraded-but-recoverable conditions
//! (tiny inputs, degenerate labelings, post-repair size violations) are
//! absorbed by the pipeline and reported through [`crate::RunReport`].

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GroupingError>;

/// Errors raised when input or configuration breaks the engine's contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GroupingError {
    /// A raw record carried no usable `userId`/`id` field.
    #[error("record #{index} has no integer userId/id")]
    MissingUserId { index: usize },

    /// A raw record was not a JSON object.
    #[error("record #{index} is not a JSON object (got {kind})")]
    MalformedRecord { index: usize, kind: &'static str },

    /// A trait weight was not a number.
    #[error("user {user_id}: weight for trait '{name}' is not numeric (got {found})")]
    NonNumericWeight {
        user_id: i64,
        name: String,
        found: String,
    },

    /// A list-form `topTraits` entry was not a string.
    #[error("user {user_id}: topTraits entry is not a trait name (got {found})")]
    InvalidTraitName { user_id: i64, found: String },

    /// A trait weight was NaN or infinite.
    #[error("user {user_id}: weight for trait '{name}' is not finite ({value})")]
    NonFiniteWeight {
        user_id: i64,
        name: String,
        value: f64,
    },

    /// A coordinate was present but not a finite number.
    #[error("user {user_id}: {field} is not a finite number (got {found})")]
    InvalidCoordinate {
        user_id: i64,
        field: &'static str,
        found: String,
    },

    /// The same user id appeared twice in one run.
    #[error("user id {0} appears more than once in the input")]
    DuplicateUserId(i64),

    /// A configuration value is out of its accepted range.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl GroupingError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
