//! Equilibrium geochemical system: the chemical state of one aqueous sample.
//!
//! An `EquilibriumSystem` borrows a `ModelDatabase`, an activity model, an
//! ionic-strength calculator and a basis swapper. It owns the constraints on
//! each basis component and keeps every derived quantity (activities,
//! equilibrium molalities, bulk moles, free mineral moles, sorbing areas)
//! consistent with the algebraic unknowns, which are:
//!
//! - the solvent water mass, if water's bulk moles are fixed
//! - the free molality of each aqueous basis species with fixed bulk moles
//! - one surface-potential expression per sorbing surface
//!
//! The residual is mass conservation for each basis unknown (with the
//! charge-balance species' row replaced by electroneutrality) and a
//! Donnan-type charge balance for each surface.

pub mod algebraic;
pub mod charge_balance;
pub mod constraint;
pub mod error;
pub mod residual;
pub mod setup;
pub mod surface;
pub mod swap;
pub mod system;

pub use algebraic::AlgebraicLayout;
pub use constraint::Constraint;
pub use error::{SystemError, SystemResult};
pub use setup::SystemSetup;
pub use system::EquilibriumSystem;
