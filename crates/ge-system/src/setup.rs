//! Construction inputs for an `EquilibriumSystem`.

use ge_core::units::{Temperature, celsius};

use crate::constraint::Constraint;

/// Everything an `EquilibriumSystem` needs besides the database and collaborators.
#[derive(Debug, Clone)]
pub struct SystemSetup {
    /// Basis species to swap out before solving, paired with `swap_into_basis`
    pub swap_out_of_basis: Vec<String>,
    pub swap_into_basis: Vec<String>,
    /// Basis species whose bulk moles are adjusted to enforce electroneutrality
    pub charge_balance_species: String,
    /// Species names, paired with `constraints`, in any order
    pub constrained_species: Vec<String>,
    pub constraints: Vec<Constraint>,
    pub temperature: Temperature,
    /// Extra Picard rounds when computing a consistent configuration
    pub iters_to_make_consistent: usize,
    /// Floor for initial molality guesses
    pub min_initial_molality: f64,
}

impl SystemSetup {
    pub fn new(charge_balance_species: impl Into<String>, temperature: Temperature) -> Self {
        Self {
            swap_out_of_basis: Vec::new(),
            swap_into_basis: Vec::new(),
            charge_balance_species: charge_balance_species.into(),
            constrained_species: Vec::new(),
            constraints: Vec::new(),
            temperature,
            iters_to_make_consistent: 0,
            min_initial_molality: 1e-20,
        }
    }

    /// Setup at 25 °C.
    pub fn at_25c(charge_balance_species: impl Into<String>) -> Self {
        Self::new(charge_balance_species, celsius(25.0))
    }

    pub fn with_constraint(mut self, species: impl Into<String>, constraint: Constraint) -> Self {
        self.constrained_species.push(species.into());
        self.constraints.push(constraint);
        self
    }

    pub fn with_swap(mut self, out_of_basis: impl Into<String>, into_basis: impl Into<String>) -> Self {
        self.swap_out_of_basis.push(out_of_basis.into());
        self.swap_into_basis.push(into_basis.into());
        self
    }

    pub fn with_consistency_iterations(mut self, iters: usize) -> Self {
        self.iters_to_make_consistent = iters;
        self
    }

    pub fn with_min_initial_molality(mut self, floor: f64) -> Self {
        self.min_initial_molality = floor;
        self
    }
}
