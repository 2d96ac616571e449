//! ge-core: stable foundation for the geochemical equilibrium workspace.
//!
//! Contains:
//! - units (uom temperature type + Celsius/Kelvin helpers)
//! - numeric (Real + tolerances + float helpers)
//! - constants (physical constants used by the speciation equations)
//! - error (shared error types)

pub mod constants;
pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
