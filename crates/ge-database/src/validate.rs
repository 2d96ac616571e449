//! Database validation logic.

use crate::database::ModelDatabase;
use crate::error::{DatabaseError, DatabaseResult};
use crate::species::WATER;

/// Validate a freshly assembled database.
///
/// Name uniqueness and reactant resolution are checked by the builder;
/// this covers the remaining structural and numeric invariants.
pub(crate) fn validate_database(db: &ModelDatabase) -> DatabaseResult<()> {
    match db.basis.first() {
        Some(first) if first.name == WATER => {}
        Some(first) => {
            return Err(DatabaseError::MissingWater {
                found: first.name.clone(),
            });
        }
        None => {
            return Err(DatabaseError::MissingWater {
                found: "an empty basis".into(),
            });
        }
    }

    if db.temperatures.is_empty() {
        return Err(DatabaseError::InvalidValue {
            what: "at least one temperature must be tabulated".into(),
        });
    }
    if db.temperatures.iter().any(|t| !t.is_finite()) {
        return Err(DatabaseError::InvalidValue {
            what: "tabulated temperatures must be finite".into(),
        });
    }

    for species in db.basis.iter().chain(db.equilibrium.iter()) {
        if !species.charge.is_finite() {
            return Err(DatabaseError::InvalidValue {
                what: format!("charge of {} is not finite", species.name),
            });
        }
        if species.molecular_weight.is_nan() || species.molecular_weight < 0.0 {
            return Err(DatabaseError::InvalidValue {
                what: format!("molecular weight of {} must not be negative", species.name),
            });
        }
        if species.radius.is_nan() || species.radius < 0.0 {
            return Err(DatabaseError::InvalidValue {
                what: format!("radius of {} must not be negative", species.name),
            });
        }
    }

    for species in &db.basis {
        if species.surface.is_some() {
            return Err(DatabaseError::SorbedBasis {
                species: species.name.clone(),
            });
        }
    }

    for species in &db.equilibrium {
        if let Some(surface) = species.surface {
            if surface >= db.surfaces.len() {
                return Err(DatabaseError::InvalidSurface {
                    species: species.name.clone(),
                    surface,
                });
            }
        }
    }

    for surface in &db.surfaces {
        if !surface.area.is_finite() || surface.area <= 0.0 {
            return Err(DatabaseError::InvalidValue {
                what: format!("area of the surface on {} must be positive", surface.mineral),
            });
        }
    }

    if db
        .stoichiometry
        .iter()
        .chain(db.redox_stoichiometry.iter())
        .any(|v| !v.is_finite())
    {
        return Err(DatabaseError::InvalidValue {
            what: "stoichiometric coefficients must be finite".into(),
        });
    }
    if db
        .log10k
        .iter()
        .chain(db.redox_log10k.iter())
        .any(|v| !v.is_finite())
    {
        return Err(DatabaseError::InvalidValue {
            what: "log10K values must be finite".into(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{DatabaseBuilder, DatabaseError, Species};

    #[test]
    fn water_must_come_first() {
        let mut b = DatabaseBuilder::new(vec![25.0]);
        b.add_basis(Species::aqueous("H+", 1.0));
        b.add_basis(Species::aqueous("H2O", 0.0));
        assert!(matches!(
            b.build(),
            Err(DatabaseError::MissingWater { found }) if found == "H+"
        ));

        let b = DatabaseBuilder::new(vec![25.0]);
        assert!(matches!(b.build(), Err(DatabaseError::MissingWater { .. })));
    }

    #[test]
    fn surface_reference_must_exist() {
        let mut b = DatabaseBuilder::new(vec![25.0]);
        b.add_basis(Species::aqueous("H2O", 0.0));
        b.add_basis(Species::aqueous("H+", 1.0));
        b.add_equilibrium(Species::sorbed(">(s)FeOH2+", 1.0, 0), &[("H+", 1.0)], &[-7.0]);
        assert!(matches!(
            b.build(),
            Err(DatabaseError::InvalidSurface { surface: 0, .. })
        ));
    }

    #[test]
    fn sorbed_basis_rejected() {
        let mut b = DatabaseBuilder::new(vec![25.0]);
        b.add_basis(Species::aqueous("H2O", 0.0));
        b.add_surface("Fe(OH)3(ppd)", 600.0);
        b.add_basis(Species::sorbed(">(s)FeOH", 0.0, 0));
        assert!(matches!(b.build(), Err(DatabaseError::SorbedBasis { .. })));
    }

    #[test]
    fn non_finite_log10k_rejected() {
        let mut b = DatabaseBuilder::new(vec![25.0]);
        b.add_basis(Species::aqueous("H2O", 0.0));
        b.add_basis(Species::aqueous("H+", 1.0));
        b.add_equilibrium(
            Species::aqueous("OH-", -1.0),
            &[("H2O", 1.0), ("H+", -1.0)],
            &[f64::NAN],
        );
        assert!(matches!(b.build(), Err(DatabaseError::InvalidValue { .. })));

        let mut b = DatabaseBuilder::new(vec![25.0]);
        b.add_basis(Species::aqueous("H2O", 0.0));
        b.add_basis(Species::aqueous("H+", 1.0));
        b.add_redox("e-", &[("H+", -1.0)], &[f64::INFINITY]);
        assert!(matches!(b.build(), Err(DatabaseError::InvalidValue { .. })));
    }

    #[test]
    fn empty_temperatures_rejected() {
        let mut b = DatabaseBuilder::new(vec![]);
        b.add_basis(Species::aqueous("H2O", 0.0));
        assert!(matches!(b.build(), Err(DatabaseError::InvalidValue { .. })));
    }
}
