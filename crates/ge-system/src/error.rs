//! Error types for equilibrium-system operations.

use ge_database::SwapError;
use thiserror::Error;

/// Errors raised by an `EquilibriumSystem`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SystemError {
    /// Construction inputs are inconsistent; the system cannot be built.
    #[error("Problem setup error: {what}")]
    Setup { what: String },

    #[error("Invalid state: {what}")]
    InvalidState { what: String },

    #[error("Illegal swap: {what}")]
    IllegalSwap { what: String },

    #[error("Cannot retrieve {what} {index} since there are only {len}")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Swap error: {0}")]
    Swap(#[from] SwapError),
}

pub type SystemResult<T> = Result<T, SystemError>;

impl SystemError {
    pub(crate) fn setup(what: impl Into<String>) -> Self {
        SystemError::Setup { what: what.into() }
    }
}
