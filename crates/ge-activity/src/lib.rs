//! ge-activity: activity coefficients and ionic strength.
//!
//! Provides:
//! - `IonicStrength` trait and the `IonicStrengthCalculator` implementation
//! - `ActivityModel` trait for activity coefficients and water activity
//! - `DebyeHuckelBdot` (B-dot extended Debye-Hückel) and `IdealActivity`
//!
//! # Architecture
//!
//! The equilibrium system only talks to these traits, so other activity
//! models can be plugged in without touching the solver. Both traits work on
//! plain molality slices indexed like the database's basis and equilibrium
//! lists, where basis slot 0 (water) holds the solvent mass and is ignored.

pub mod debye_huckel;
pub mod error;
pub mod ideal;
pub mod ionic_strength;
pub mod model;

pub use debye_huckel::{DebyeHuckelBdot, DebyeHuckelParams};
pub use error::{ActivityError, ActivityResult};
pub use ideal::IdealActivity;
pub use ionic_strength::IonicStrengthCalculator;
pub use model::{ActivityModel, IonicStrength};
