//! Ideal solution: every activity coefficient is 1.

use ge_database::ModelDatabase;

use crate::model::{ActivityModel, IonicStrength};

#[derive(Debug, Clone, Copy, Default)]
pub struct IdealActivity;

impl ActivityModel for IdealActivity {
    fn set_internal_parameters(
        &mut self,
        _temperature: f64,
        _db: &ModelDatabase,
        _basis_molality: &[f64],
        _eqm_molality: &[f64],
        _ionic: &dyn IonicStrength,
    ) {
    }

    fn build_activity_coefficients(
        &self,
        _db: &ModelDatabase,
        basis_gamma: &mut [f64],
        eqm_gamma: &mut [f64],
    ) {
        basis_gamma.fill(1.0);
        eqm_gamma.fill(1.0);
    }

    fn water_activity(&self) -> f64 {
        1.0
    }
}
