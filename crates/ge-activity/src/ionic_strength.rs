//! Ionic strength calculator.

use ge_database::{ModelDatabase, Species};

use crate::model::IonicStrength;

const CHLORIDE: &str = "Cl-";

/// Standard ionic-strength calculator.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IonicStrengthCalculator {
    pub max_ionic_strength: f64,
    pub max_stoichiometric_ionic_strength: f64,
    /// Ignore equilibrium species when summing
    pub use_only_basis_molality: bool,
    /// Stoichiometric ionic strength is the Cl- molality
    pub use_only_cl_molality: bool,
}

impl Default for IonicStrengthCalculator {
    fn default() -> Self {
        Self::new(3.0, 3.0)
    }
}

impl IonicStrengthCalculator {
    pub fn new(max_ionic_strength: f64, max_stoichiometric_ionic_strength: f64) -> Self {
        Self {
            max_ionic_strength,
            max_stoichiometric_ionic_strength,
            use_only_basis_molality: false,
            use_only_cl_molality: false,
        }
    }

    pub fn with_only_basis_molality(mut self, flag: bool) -> Self {
        self.use_only_basis_molality = flag;
        self
    }

    pub fn with_only_cl_molality(mut self, flag: bool) -> Self {
        self.use_only_cl_molality = flag;
        self
    }

    fn counts_as_solute(species: &Species) -> bool {
        !species.is_mineral() && !species.is_gas() && !species.is_surface_related()
    }

    fn chloride_molality(
        &self,
        db: &ModelDatabase,
        basis_molality: &[f64],
        eqm_molality: &[f64],
    ) -> f64 {
        if let Some(i) = db.basis_index_of(CHLORIDE) {
            return basis_molality[i];
        }
        match db.equilibrium_index_of(CHLORIDE) {
            Some(j) if !self.use_only_basis_molality => eqm_molality[j],
            _ => 0.0,
        }
    }
}

impl IonicStrength for IonicStrengthCalculator {
    fn ionic_strength(
        &self,
        db: &ModelDatabase,
        basis_molality: &[f64],
        eqm_molality: &[f64],
    ) -> f64 {
        let mut sum = 0.0;
        for (species, m) in db.basis().iter().zip(basis_molality).skip(1) {
            if Self::counts_as_solute(species) {
                sum += m * species.charge * species.charge;
            }
        }
        if !self.use_only_basis_molality {
            for (species, m) in db.equilibrium().iter().zip(eqm_molality) {
                if Self::counts_as_solute(species) {
                    sum += m * species.charge * species.charge;
                }
            }
        }
        (0.5 * sum).min(self.max_ionic_strength)
    }

    fn stoichiometric_ionic_strength(
        &self,
        db: &ModelDatabase,
        basis_molality: &[f64],
        eqm_molality: &[f64],
    ) -> f64 {
        if self.use_only_cl_molality {
            return self
                .chloride_molality(db, basis_molality, eqm_molality)
                .min(self.max_stoichiometric_ionic_strength);
        }

        let mut sum = 0.0;
        for (species, m) in db.basis().iter().zip(basis_molality).skip(1) {
            if Self::counts_as_solute(species) {
                sum += m * species.charge * species.charge;
            }
        }
        if !self.use_only_basis_molality {
            for (j, (species, m)) in db.equilibrium().iter().zip(eqm_molality).enumerate() {
                if !Self::counts_as_solute(species) {
                    continue;
                }
                if species.is_charged() {
                    sum += m * species.charge * species.charge;
                } else {
                    let constituents: f64 = db
                        .basis()
                        .iter()
                        .enumerate()
                        .skip(1)
                        .map(|(i, b)| db.stoich(j, i).abs() * b.charge * b.charge)
                        .sum();
                    sum += m * constituents;
                }
            }
        }
        (0.5 * sum).min(self.max_stoichiometric_ionic_strength)
    }

    fn max_ionic_strength(&self) -> f64 {
        self.max_ionic_strength
    }

    fn set_max_ionic_strength(&mut self, value: f64) {
        self.max_ionic_strength = value;
    }

    fn max_stoichiometric_ionic_strength(&self) -> f64 {
        self.max_stoichiometric_ionic_strength
    }

    fn set_max_stoichiometric_ionic_strength(&mut self, value: f64) {
        self.max_stoichiometric_ionic_strength = value;
    }
}
