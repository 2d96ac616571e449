//! Database and swap errors.

use thiserror::Error;

/// Result type for database construction.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Result type for basis swaps.
pub type SwapResult<T> = Result<T, SwapError>;

/// Errors raised while building or validating a `ModelDatabase`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatabaseError {
    #[error("The first basis species must be H2O, found {found}")]
    MissingWater { found: String },

    #[error("Species {name} appears more than once in the database")]
    DuplicateSpecies { name: String },

    #[error("Reaction for {species} refers to {name}, which is not a basis species")]
    UnknownReactant { species: String, name: String },

    #[error("Species {species} has {got} log10K values but {expected} temperatures are tabulated")]
    Log10KArity {
        species: String,
        expected: usize,
        got: usize,
    },

    #[error("Species {species} refers to sorbing surface {surface}, which does not exist")]
    InvalidSurface { species: String, surface: usize },

    #[error("Basis species {species} cannot be surface-sorption related")]
    SorbedBasis { species: String },

    #[error("Invalid database value: {what}")]
    InvalidValue { what: String },
}

/// Errors raised by a basis swap.
///
/// These are recoverable: the database is left untouched when a swap is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapError {
    #[error("{name} is not in the basis, so cannot be removed from the basis")]
    NotInBasis { name: String },

    #[error("{name} is not an equilibrium species, so cannot be inserted into the basis")]
    NotEquilibrium { name: String },

    #[error("Cannot remove H2O from the basis")]
    Water,

    #[error("{index} exceeds the number of basis species in the problem")]
    BasisIndex { index: usize },

    #[error("{index} exceeds the number of equilibrium species in the problem")]
    EquilibriumIndex { index: usize },

    #[error(
        "Equilibrium species {name} is involved in surface sorption so cannot be swapped into the basis"
    )]
    SurfaceSorption { name: String },

    #[error(
        "Matrix is not invertible, which signals an invalid basis swap: stoichiometric coefficient of {basis} in {equilibrium} is {pivot}"
    )]
    Singular {
        basis: String,
        equilibrium: String,
        pivot: f64,
    },

    #[error("bulk composition has size {got} which differs from the basis size {expected}")]
    BulkSize { got: usize, expected: usize },
}
