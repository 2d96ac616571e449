//! Activity model errors.

use thiserror::Error;

/// Result type for activity model construction.
pub type ActivityResult<T> = Result<T, ActivityError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActivityError {
    /// Model parameter is non-finite or outside its physical range.
    #[error("Invalid activity model parameter {what}: {value}")]
    InvalidParameter { what: &'static str, value: f64 },

    #[error("Debye-Hückel table must contain at least one temperature")]
    EmptyTable,
}
