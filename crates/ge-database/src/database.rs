//! The model database: species, stoichiometry and equilibrium constants.

use std::collections::HashMap;

use nalgebra::DMatrix;

use crate::species::{SorbingSurface, Species};

/// Basis and equilibrium species together with their reactions.
///
/// Equilibrium species `j` forms by the reaction
/// `E_j = Σ_i stoichiometry[(j, i)] B_i`, and `log10k[(j, t)]` is the
/// log10 equilibrium constant of that reaction at tabulated temperature `t`.
/// Basis species 0 is always water.
///
/// Redox couples held out of equilibrium are stored separately: row `r` of
/// `redox_stoichiometry` expresses couple `r` in terms of the basis, with
/// log10K in row `r` of `redox_log10k`. They never enter the mass balance.
///
/// The database is mutated only by a `BasisSwapper`, which keeps the two
/// name maps, the stoichiometry and the log10K table consistent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelDatabase {
    pub(crate) basis: Vec<Species>,
    pub(crate) equilibrium: Vec<Species>,
    pub(crate) basis_index: HashMap<String, usize>,
    pub(crate) equilibrium_index: HashMap<String, usize>,
    pub(crate) stoichiometry: DMatrix<f64>,
    pub(crate) log10k: DMatrix<f64>,
    /// Tabulated temperatures [°C]
    pub(crate) temperatures: Vec<f64>,
    pub(crate) surfaces: Vec<SorbingSurface>,
    pub(crate) kinetic_species: Vec<String>,
    pub(crate) redox_couples: Vec<String>,
    pub(crate) redox_stoichiometry: DMatrix<f64>,
    pub(crate) redox_log10k: DMatrix<f64>,
}

impl ModelDatabase {
    pub fn num_basis(&self) -> usize {
        self.basis.len()
    }

    pub fn num_equilibrium(&self) -> usize {
        self.equilibrium.len()
    }

    pub fn num_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    pub fn num_temperatures(&self) -> usize {
        self.temperatures.len()
    }

    pub fn basis(&self) -> &[Species] {
        &self.basis
    }

    pub fn equilibrium(&self) -> &[Species] {
        &self.equilibrium
    }

    pub fn basis_species(&self, i: usize) -> &Species {
        &self.basis[i]
    }

    pub fn equilibrium_species(&self, j: usize) -> &Species {
        &self.equilibrium[j]
    }

    pub fn basis_index_of(&self, name: &str) -> Option<usize> {
        self.basis_index.get(name).copied()
    }

    pub fn equilibrium_index_of(&self, name: &str) -> Option<usize> {
        self.equilibrium_index.get(name).copied()
    }

    /// Stoichiometric matrix, one row per equilibrium species.
    pub fn stoichiometry(&self) -> &DMatrix<f64> {
        &self.stoichiometry
    }

    pub fn stoich(&self, j: usize, i: usize) -> f64 {
        self.stoichiometry[(j, i)]
    }

    /// log10K table, one row per equilibrium species and one column per temperature.
    pub fn log10k_table(&self) -> &DMatrix<f64> {
        &self.log10k
    }

    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    pub fn surfaces(&self) -> &[SorbingSurface] {
        &self.surfaces
    }

    pub fn surface(&self, s: usize) -> &SorbingSurface {
        &self.surfaces[s]
    }

    /// Names of kinetic species; an equilibrium system requires this to be empty.
    pub fn kinetic_species(&self) -> &[String] {
        &self.kinetic_species
    }

    /// Column of the tabulated temperature nearest to `temperature` [°C].
    ///
    /// Ties go to the lower temperature.
    pub fn temperature_column(&self, temperature: f64) -> usize {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (t, &tab) in self.temperatures.iter().enumerate() {
            let dist = (tab - temperature).abs();
            if dist < best_dist {
                best = t;
                best_dist = dist;
            }
        }
        best
    }

    /// log10K of every equilibrium reaction at `temperature` [°C].
    pub fn log10k_at(&self, temperature: f64) -> Vec<f64> {
        let col = self.temperature_column(temperature);
        (0..self.num_equilibrium())
            .map(|j| self.log10k[(j, col)])
            .collect()
    }

    /// Number of redox couples in disequilibrium.
    pub fn num_redox(&self) -> usize {
        self.redox_couples.len()
    }

    /// Names of the redox couples, in row order.
    pub fn redox_couples(&self) -> &[String] {
        &self.redox_couples
    }

    /// Redox stoichiometry, one row per couple.
    pub fn redox_stoichiometry(&self) -> &DMatrix<f64> {
        &self.redox_stoichiometry
    }

    pub fn redox_stoich(&self, r: usize, i: usize) -> f64 {
        self.redox_stoichiometry[(r, i)]
    }

    /// log10K of every redox couple at `temperature` [°C].
    pub fn redox_log10k_at(&self, temperature: f64) -> Vec<f64> {
        let col = self.temperature_column(temperature);
        (0..self.num_redox())
            .map(|r| self.redox_log10k[(r, col)])
            .collect()
    }
}
