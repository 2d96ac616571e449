//! Basis-species constraints.

use ge_database::Species;

use crate::error::{SystemError, SystemResult};

/// The single user constraint attached to a basis species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Total moles of water (solvent mass becomes an unknown)
    BulkMolesWater(f64),
    /// Mass of solvent water [kg]
    KgSolventWater(f64),
    /// Total moles of the component
    BulkMolesSpecies(f64),
    /// Free molality [mol/kg]
    FreeMolality(f64),
    /// Free moles of a basis mineral
    FreeMolesMineral(f64),
    /// Fugacity of a basis gas
    Fugacity(f64),
    /// Activity
    Activity(f64),
}

impl Constraint {
    pub fn value(&self) -> f64 {
        match *self {
            Constraint::BulkMolesWater(v)
            | Constraint::KgSolventWater(v)
            | Constraint::BulkMolesSpecies(v)
            | Constraint::FreeMolality(v)
            | Constraint::FreeMolesMineral(v)
            | Constraint::Fugacity(v)
            | Constraint::Activity(v) => v,
        }
    }

    /// Same meaning, new value.
    pub fn with_value(self, v: f64) -> Self {
        match self {
            Constraint::BulkMolesWater(_) => Constraint::BulkMolesWater(v),
            Constraint::KgSolventWater(_) => Constraint::KgSolventWater(v),
            Constraint::BulkMolesSpecies(_) => Constraint::BulkMolesSpecies(v),
            Constraint::FreeMolality(_) => Constraint::FreeMolality(v),
            Constraint::FreeMolesMineral(_) => Constraint::FreeMolesMineral(v),
            Constraint::Fugacity(_) => Constraint::Fugacity(v),
            Constraint::Activity(_) => Constraint::Activity(v),
        }
    }

    /// True for constraints that fix the activity (or fugacity) directly.
    pub fn fixes_activity(&self) -> bool {
        matches!(self, Constraint::Activity(_) | Constraint::Fugacity(_))
    }

    /// Check the sign rule of this constraint's value.
    pub(crate) fn check_value(&self, species: &str) -> SystemResult<()> {
        let v = self.value();
        if !v.is_finite() {
            return Err(SystemError::setup(format!(
                "Constraint value for {species} must be finite: you entered {v}"
            )));
        }
        let what = match self {
            Constraint::KgSolventWater(_) => "mass of solvent water",
            Constraint::Activity(_) => "activity values",
            Constraint::Fugacity(_) => "fugacity values",
            Constraint::FreeMolality(_) => "free molality values",
            Constraint::FreeMolesMineral(_) => "free mole number of mineral species",
            Constraint::BulkMolesWater(_) | Constraint::BulkMolesSpecies(_) => return Ok(()),
        };
        if v <= 0.0 {
            return Err(SystemError::setup(format!(
                "Specified {what} must be positive: you entered {v}"
            )));
        }
        Ok(())
    }

    /// Check that this constraint is allowed for `species`.
    pub(crate) fn check_kind(&self, species: &Species) -> SystemResult<()> {
        let name = &species.name;
        if species.is_water() {
            return match self {
                Constraint::BulkMolesWater(_)
                | Constraint::KgSolventWater(_)
                | Constraint::Activity(_) => Ok(()),
                _ => Err(SystemError::setup(
                    "H2O must be provided with either a mass of solvent water, a bulk number of moles, or an activity",
                )),
            };
        }
        if species.is_gas() {
            return match self {
                Constraint::Fugacity(_) => Ok(()),
                _ => Err(SystemError::setup(format!(
                    "The gas {name} must be provided with a fugacity"
                ))),
            };
        }
        if species.is_mineral() {
            return match self {
                Constraint::FreeMolesMineral(_) | Constraint::BulkMolesSpecies(_) => Ok(()),
                _ => Err(SystemError::setup(format!(
                    "The mineral {name} must be provided with a free number of moles or a bulk number of moles"
                ))),
            };
        }
        match self {
            Constraint::FreeMolality(_) | Constraint::Activity(_) | Constraint::BulkMolesSpecies(_) => {
                Ok(())
            }
            _ => Err(SystemError::setup(format!(
                "The basis species {name} must be provided with a free molality, bulk number of moles, or an activity"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_and_with_value() {
        let c = Constraint::FreeMolality(1e-3);
        assert_eq!(c.value(), 1e-3);
        assert_eq!(c.with_value(2.0), Constraint::FreeMolality(2.0));
        assert!(Constraint::Fugacity(1.0).fixes_activity());
        assert!(!Constraint::FreeMolality(1.0).fixes_activity());
    }

    #[test]
    fn positivity_rules() {
        assert!(Constraint::BulkMolesSpecies(-1.0).check_value("Cl-").is_ok());
        let err = Constraint::KgSolventWater(0.0).check_value("H2O").unwrap_err();
        assert!(
            err.to_string()
                .contains("Specified mass of solvent water must be positive: you entered 0")
        );
        let err = Constraint::FreeMolesMineral(-2.0).check_value("Calcite").unwrap_err();
        assert!(err.to_string().contains("free mole number of mineral species"));
        assert!(Constraint::Activity(f64::NAN).check_value("H+").is_err());
    }

    #[test]
    fn kind_rules() {
        let water = Species::aqueous("H2O", 0.0);
        assert!(Constraint::Activity(1.0).check_kind(&water).is_ok());
        assert!(Constraint::FreeMolality(1.0).check_kind(&water).is_err());

        let gas = Species::gas("O2(g)");
        let err = Constraint::Activity(1.0).check_kind(&gas).unwrap_err();
        assert!(err.to_string().contains("The gas O2(g) must be provided with a fugacity"));

        let mineral = Species::mineral("Calcite");
        assert!(Constraint::BulkMolesSpecies(1.0).check_kind(&mineral).is_ok());
        assert!(Constraint::FreeMolality(1.0).check_kind(&mineral).is_err());

        let ion = Species::aqueous("Na+", 1.0);
        assert!(Constraint::Fugacity(1.0).check_kind(&ion).is_err());
        assert!(Constraint::FreeMolality(1.0).check_kind(&ion).is_ok());
    }
}
