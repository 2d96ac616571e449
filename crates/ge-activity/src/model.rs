//! Activity and ionic-strength model traits.

use ge_database::ModelDatabase;

/// Computes ionic strengths from species molalities.
///
/// Implementations cap both ionic strengths at their configured maxima; the
/// solver ramps these caps during the first Newton iterations.
pub trait IonicStrength {
    /// True ionic strength `½ Σ m z²`, capped at `max_ionic_strength()`.
    fn ionic_strength(
        &self,
        db: &ModelDatabase,
        basis_molality: &[f64],
        eqm_molality: &[f64],
    ) -> f64;

    /// Stoichiometric ionic strength, capped at `max_stoichiometric_ionic_strength()`.
    ///
    /// Neutral complexes contribute through the charges of their constituents.
    fn stoichiometric_ionic_strength(
        &self,
        db: &ModelDatabase,
        basis_molality: &[f64],
        eqm_molality: &[f64],
    ) -> f64;

    fn max_ionic_strength(&self) -> f64;

    fn set_max_ionic_strength(&mut self, value: f64);

    fn max_stoichiometric_ionic_strength(&self) -> f64;

    fn set_max_stoichiometric_ionic_strength(&mut self, value: f64);
}

/// Activity-coefficient model.
///
/// The system calls `set_internal_parameters` with the current molalities,
/// then `build_activity_coefficients` and `water_activity`.
pub trait ActivityModel {
    /// Update internal state (ionic strengths, temperature-dependent coefficients).
    ///
    /// `temperature` is in °C.
    fn set_internal_parameters(
        &mut self,
        temperature: f64,
        db: &ModelDatabase,
        basis_molality: &[f64],
        eqm_molality: &[f64],
        ionic: &dyn IonicStrength,
    );

    /// Write activity coefficients for every basis and equilibrium species.
    ///
    /// Slices have the lengths of the database's basis and equilibrium lists.
    fn build_activity_coefficients(
        &self,
        db: &ModelDatabase,
        basis_gamma: &mut [f64],
        eqm_gamma: &mut [f64],
    );

    /// Activity of the solvent water.
    fn water_activity(&self) -> f64;
}
