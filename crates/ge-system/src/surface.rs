//! Surface complexation: Donnan-type potential terms.

use ge_core::constants::{
    CELSIUS_TO_KELVIN, DENSITY_WATER, DIELECTRIC_CONSTANT_WATER, FARADAY, GAS_CONSTANT,
    PERMITTIVITY_FREE_SPACE,
};

use crate::error::{SystemError, SystemResult};
use crate::system::EquilibriumSystem;

impl EquilibriumSystem<'_> {
    /// Equilibrium species sorbed on surface `s`.
    pub(crate) fn surface_species(&self, s: usize) -> impl Iterator<Item = usize> + '_ {
        self.db
            .equilibrium()
            .iter()
            .enumerate()
            .filter(move |(_, species)| species.surface == Some(s))
            .map(|(j, _)| j)
    }

    /// `½ A / F sqrt(R T ε₀ ε_w ρ_w I)`
    pub(crate) fn surface_pot_prefactor(&self, s: usize) -> f64 {
        0.5 * self.sorbing_surface_area[s] / FARADAY
            * (GAS_CONSTANT
                * (self.temperature + CELSIUS_TO_KELVIN)
                * PERMITTIVITY_FREE_SPACE
                * DIELECTRIC_CONSTANT_WATER
                * DENSITY_WATER
                * self.ionic_strength())
            .sqrt()
    }

    fn check_surface(&self, s: usize) -> SystemResult<()> {
        if s < self.num_surfaces() {
            Ok(())
        } else {
            Err(SystemError::IndexOutOfRange {
                what: "surface",
                index: s,
                len: self.num_surfaces(),
            })
        }
    }

    /// Electrical potential of surface `s` [V].
    pub fn surface_potential(&self, s: usize) -> SystemResult<f64> {
        self.check_surface(s)?;
        Ok(-2.0 * GAS_CONSTANT * (self.temperature + CELSIUS_TO_KELVIN) / FARADAY
            * self.surface_pot_expr[s].ln())
    }

    /// Surface charge density of surface `s` [C/m²].
    pub fn surface_charge(&self, s: usize) -> SystemResult<f64> {
        self.check_surface(s)?;
        let psi = self.surface_pot_expr[s];
        let per_area = self.surface_pot_prefactor(s) / self.sorbing_surface_area[s];
        Ok(per_area * (1.0 / psi - psi) * FARADAY)
    }

    /// Area of each sorbing surface [m²].
    pub fn sorbing_surface_area(&self) -> &[f64] {
        &self.sorbing_surface_area
    }

    /// Surface-potential expressions `exp(-F ψ / 2RT)`, one per surface.
    pub fn surface_potential_expressions(&self) -> &[f64] {
        &self.surface_pot_expr
    }
}
