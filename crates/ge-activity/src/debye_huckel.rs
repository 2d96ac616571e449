//! B-dot extended Debye-Hückel activity model.
//!
//! For charged aqueous species
//!
//! ```text
//! log10 γ = -A z² √I / (1 + B å √I) + Ḃ I
//! ```
//!
//! and γ = 1 for neutral species, minerals, gases and surface complexes.
//! Water activity follows the B-dot osmotic-coefficient expression evaluated
//! at the stoichiometric ionic strength.

use ge_core::constants::{LOGTEN, MOLES_PER_KG_WATER};
use ge_database::{ModelDatabase, Species};

use crate::error::{ActivityError, ActivityResult};
use crate::model::{ActivityModel, IonicStrength};

/// Debye-Hückel coefficients at one temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebyeHuckelParams {
    /// Debye-Hückel A [kg^½ mol^-½]
    pub a: f64,
    /// Debye-Hückel B [kg^½ mol^-½ Å^-1]
    pub b: f64,
    /// B-dot [kg/mol]
    pub bdot: f64,
    /// Water B-dot polynomial coefficients `bdot_w = c0 + c1 I + c2 I² + c3 I³`
    pub water: [f64; 4],
}

impl Default for DebyeHuckelParams {
    /// Coefficients at 25 °C.
    fn default() -> Self {
        Self {
            a: 0.5092,
            b: 0.3283,
            bdot: 0.0410,
            water: [0.0410, 0.0, 0.0, 0.0],
        }
    }
}

impl DebyeHuckelParams {
    pub fn validate(&self) -> ActivityResult<()> {
        let check = |what: &'static str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ActivityError::InvalidParameter { what, value })
            }
        };
        check("A", self.a)?;
        check("B", self.b)?;
        if !self.bdot.is_finite() {
            return Err(ActivityError::InvalidParameter {
                what: "bdot",
                value: self.bdot,
            });
        }
        if let Some(bad) = self.water.iter().find(|c| !c.is_finite()) {
            return Err(ActivityError::InvalidParameter {
                what: "water bdot coefficient",
                value: *bad,
            });
        }
        Ok(())
    }
}

/// B-dot activity model with coefficients tabulated by temperature.
#[derive(Debug, Clone)]
pub struct DebyeHuckelBdot {
    table: Vec<(f64, DebyeHuckelParams)>,
    current: DebyeHuckelParams,
    ionic_strength: f64,
    stoichiometric_ionic_strength: f64,
}

impl Default for DebyeHuckelBdot {
    fn default() -> Self {
        Self::from_params(DebyeHuckelParams::default())
    }
}

impl DebyeHuckelBdot {
    fn from_params(params: DebyeHuckelParams) -> Self {
        Self {
            table: vec![(25.0, params)],
            current: params,
            ionic_strength: 0.0,
            stoichiometric_ionic_strength: 0.0,
        }
    }

    /// Model with one set of coefficients used at every temperature.
    pub fn new(params: DebyeHuckelParams) -> ActivityResult<Self> {
        params.validate()?;
        Ok(Self::from_params(params))
    }

    /// Model with coefficients tabulated at several temperatures [°C].
    ///
    /// The entry nearest the requested temperature is used.
    pub fn with_table(table: Vec<(f64, DebyeHuckelParams)>) -> ActivityResult<Self> {
        let first = table.first().ok_or(ActivityError::EmptyTable)?.1;
        for (t, params) in &table {
            if !t.is_finite() {
                return Err(ActivityError::InvalidParameter {
                    what: "table temperature",
                    value: *t,
                });
            }
            params.validate()?;
        }
        Ok(Self {
            table,
            current: first,
            ionic_strength: 0.0,
            stoichiometric_ionic_strength: 0.0,
        })
    }

    /// Coefficients selected by the last `set_internal_parameters`.
    pub fn params(&self) -> &DebyeHuckelParams {
        &self.current
    }

    pub fn ionic_strength(&self) -> f64 {
        self.ionic_strength
    }

    pub fn stoichiometric_ionic_strength(&self) -> f64 {
        self.stoichiometric_ionic_strength
    }

    fn nearest(&self, temperature: f64) -> DebyeHuckelParams {
        let mut best = self.current;
        let mut best_dist = f64::INFINITY;
        for (t, params) in &self.table {
            let dist = (t - temperature).abs();
            if dist < best_dist {
                best = *params;
                best_dist = dist;
            }
        }
        best
    }

    /// log10 activity coefficient of a species of charge `z` and radius `radius`.
    pub fn log10_gamma(&self, z: f64, radius: f64) -> f64 {
        if z == 0.0 {
            return 0.0;
        }
        let p = &self.current;
        let sqrt_i = self.ionic_strength.sqrt();
        -p.a * z * z * sqrt_i / (1.0 + p.b * radius * sqrt_i) + p.bdot * self.ionic_strength
    }

    fn gamma(&self, species: &Species) -> f64 {
        if species.is_mineral() || species.is_gas() || species.is_surface_related() {
            return 1.0;
        }
        10f64.powf(self.log10_gamma(species.charge, species.radius))
    }
}

impl ActivityModel for DebyeHuckelBdot {
    fn set_internal_parameters(
        &mut self,
        temperature: f64,
        db: &ModelDatabase,
        basis_molality: &[f64],
        eqm_molality: &[f64],
        ionic: &dyn IonicStrength,
    ) {
        self.current = self.nearest(temperature);
        self.ionic_strength = ionic.ionic_strength(db, basis_molality, eqm_molality);
        self.stoichiometric_ionic_strength =
            ionic.stoichiometric_ionic_strength(db, basis_molality, eqm_molality);
    }

    fn build_activity_coefficients(
        &self,
        db: &ModelDatabase,
        basis_gamma: &mut [f64],
        eqm_gamma: &mut [f64],
    ) {
        for (g, species) in basis_gamma.iter_mut().zip(db.basis()) {
            *g = if species.is_water() {
                1.0
            } else {
                self.gamma(species)
            };
        }
        for (g, species) in eqm_gamma.iter_mut().zip(db.equilibrium()) {
            *g = self.gamma(species);
        }
    }

    fn water_activity(&self) -> f64 {
        let i = self.stoichiometric_ionic_strength;
        if i <= 0.0 {
            return 1.0;
        }
        let p = &self.current;
        let [c0, c1, c2, c3] = p.water;
        let bdot_w = c0 + i * (c1 + i * (c2 + i * c3));
        let sqrt_i = i.sqrt();
        let y = 1.5 * sqrt_i;
        let sigma = if y < 1e-3 {
            1.0 - 1.5 * y
        } else {
            let x = 1.0 + y;
            3.0 / (y * y * y) * (x - 1.0 / x - 2.0 * x.ln())
        };
        let osmotic = 1.0 - LOGTEN * p.a * sqrt_i * sigma / 3.0 + LOGTEN * bdot_w * i / 2.0;
        (-2.0 * i * osmotic / MOLES_PER_KG_WATER).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IonicStrengthCalculator;
    use ge_database::DatabaseBuilder;

    fn model_at(ionic_strength: f64) -> DebyeHuckelBdot {
        let mut m = DebyeHuckelBdot::default();
        m.ionic_strength = ionic_strength;
        m.stoichiometric_ionic_strength = ionic_strength;
        m
    }

    #[test]
    fn neutral_species_are_ideal() {
        let m = model_at(0.5);
        assert_eq!(m.log10_gamma(0.0, 4.0), 0.0);
    }

    #[test]
    fn bdot_formula_value() {
        let m = model_at(0.1);
        let sqrt_i = 0.1_f64.sqrt();
        let expected = -0.5092 * sqrt_i / (1.0 + 0.3283 * 4.0 * sqrt_i) + 0.0410 * 0.1;
        assert!((m.log10_gamma(1.0, 4.0) - expected).abs() < 1e-15);
        assert!((m.log10_gamma(-1.0, 4.0) - expected).abs() < 1e-15);
    }

    #[test]
    fn divalent_ions_deviate_more() {
        let m = model_at(0.05);
        assert!(m.log10_gamma(2.0, 6.0) < m.log10_gamma(1.0, 6.0));
    }

    #[test]
    fn water_activity_is_one_without_solutes() {
        let m = model_at(0.0);
        assert_eq!(m.water_activity(), 1.0);
    }

    #[test]
    fn water_activity_drops_with_salt() {
        let a1 = model_at(0.1).water_activity();
        let a2 = model_at(1.0).water_activity();
        assert!(a1 < 1.0);
        assert!(a2 < a1);
        // dilute limit: ln a_w ~ -2 I / 55.5
        assert!((a1.ln() + 2.0 * 0.1 / MOLES_PER_KG_WATER).abs() < 5e-4);
    }

    #[test]
    fn table_picks_nearest_temperature() {
        let cold = DebyeHuckelParams {
            a: 0.4913,
            b: 0.3247,
            bdot: 0.0374,
            water: [0.0374, 0.0, 0.0, 0.0],
        };
        let warm = DebyeHuckelParams::default();
        let mut m = DebyeHuckelBdot::with_table(vec![(0.0, cold), (25.0, warm)]).unwrap();

        let mut b = DatabaseBuilder::new(vec![25.0]);
        b.add_basis(Species::aqueous("H2O", 0.0));
        let db = b.build().unwrap();
        let ionic = IonicStrengthCalculator::default();

        m.set_internal_parameters(5.0, &db, &[1.0], &[], &ionic);
        assert_eq!(m.params().a, 0.4913);
        m.set_internal_parameters(20.0, &db, &[1.0], &[], &ionic);
        assert_eq!(m.params().a, 0.5092);
    }

    #[test]
    fn invalid_params_rejected() {
        let params = DebyeHuckelParams {
            a: f64::NAN,
            ..DebyeHuckelParams::default()
        };
        assert!(matches!(
            DebyeHuckelBdot::new(params),
            Err(ActivityError::InvalidParameter { what: "A", .. })
        ));
        assert_eq!(
            DebyeHuckelBdot::with_table(vec![]).unwrap_err(),
            ActivityError::EmptyTable
        );
    }

    #[test]
    fn coefficients_cover_every_species() {
        let mut b = DatabaseBuilder::new(vec![25.0]);
        b.add_basis(Species::aqueous("H2O", 0.0));
        b.add_basis(Species::aqueous("Ca++", 2.0).with_radius(6.0));
        b.add_basis(Species::aqueous("Cl-", -1.0).with_radius(3.0));
        b.add_equilibrium(
            Species::mineral("CaCl2(s)"),
            &[("Ca++", 1.0), ("Cl-", 2.0)],
            &[10.0],
        );
        b.add_equilibrium(
            Species::aqueous("CaCl+", 1.0).with_radius(4.0),
            &[("Ca++", 1.0), ("Cl-", 1.0)],
            &[0.7],
        );
        let db = b.build().unwrap();

        let mut m = DebyeHuckelBdot::default();
        let ionic = IonicStrengthCalculator::default();
        m.set_internal_parameters(25.0, &db, &[1.0, 0.01, 0.02], &[0.0, 0.0], &ionic);
        assert!((m.ionic_strength() - 0.5 * (0.04 + 0.02)).abs() < 1e-15);

        let mut basis_gamma = vec![0.0; 3];
        let mut eqm_gamma = vec![0.0; 2];
        m.build_activity_coefficients(&db, &mut basis_gamma, &mut eqm_gamma);
        assert_eq!(basis_gamma[0], 1.0);
        assert!(basis_gamma[1] < basis_gamma[2]);
        assert_eq!(eqm_gamma[0], 1.0);
        assert!(eqm_gamma[1] < 1.0);
    }
}
