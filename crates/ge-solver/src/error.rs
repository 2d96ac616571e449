//! Error types for solver operations.

use ge_core::CoreError;
use ge_system::SystemError;
use thiserror::Error;

/// Errors that can occur while solving an equilibrium system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid solver configuration: {what}")]
    Config { what: String },

    /// A swap condition fired but nothing may legitimately be swapped.
    #[error("No swap candidate: {what}")]
    NoSwapCandidate { what: String },

    #[error("Maximum number of swaps performed: {swaps} swaps exceed the {max} allowed")]
    TooManySwaps { swaps: usize, max: usize },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("System error: {0}")]
    System(#[from] SystemError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<CoreError> for SolverError {
    fn from(e: CoreError) -> Self {
        SolverError::Numeric {
            what: e.to_string(),
        }
    }
}

impl SolverError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        SolverError::Config { what: what.into() }
    }
}
