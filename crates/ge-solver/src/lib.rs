//! Newton solver for equilibrium geochemical systems.
//!
//! The unknowns are the algebraic variables of an `EquilibriumSystem`: the
//! solvent water mass, free molalities of bulk-constrained basis species and
//! surface-potential expressions. Newton steps are underrelaxed so every
//! unknown stays positive. Between Newton solves the basis may be swapped to
//! remove an exhausted species, replace a dissolved mineral or precipitate a
//! supersaturated one.

pub mod config;
pub mod error;
pub mod jacobian;
pub mod newton;
pub mod residual_reduction;
pub mod solve;
pub mod swap_decision;

pub use config::{JacobianMode, SolverConfig};
pub use error::{SolverError, SolverResult};
pub use solve::{EquilibriumSolver, SolveReport};
pub use swap_decision::{SwapProposal, SwapReason, swap_needed};
