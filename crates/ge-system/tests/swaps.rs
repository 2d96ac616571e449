//! Basis swaps performed on a live system.

use ge_activity::{DebyeHuckelBdot, DebyeHuckelParams, IonicStrengthCalculator};
use ge_database::{DatabaseBuilder, ModelDatabase, Species, SpeciesSwapper};
use ge_system::{Constraint, EquilibriumSystem, SystemError, SystemSetup};
use proptest::prelude::*;

fn db() -> ModelDatabase {
    let mut b = DatabaseBuilder::new(vec![25.0]);
    b.add_basis(Species::aqueous("H2O", 0.0).with_molecular_weight(18.0152));
    b.add_basis(Species::aqueous("H+", 1.0).with_radius(9.0));
    b.add_basis(Species::aqueous("HCO3-", -1.0).with_radius(4.5));
    b.add_basis(Species::aqueous("Ca++", 2.0).with_radius(6.0));
    b.add_basis(Species::gas("O2(g)"));
    b.add_equilibrium(
        Species::aqueous("CO2(aq)", 0.0).with_radius(4.0),
        &[("H2O", -1.0), ("H+", 1.0), ("HCO3-", 1.0)],
        &[-6.3447],
    );
    b.add_equilibrium(
        Species::aqueous("CaOH+", 1.0).with_radius(4.0),
        &[("Ca++", 1.0), ("H2O", 1.0), ("H+", -1.0)],
        &[12.85],
    );
    b.add_equilibrium(
        Species::aqueous("OH-", -1.0).with_radius(3.5),
        &[("H2O", 1.0), ("H+", -1.0)],
        &[13.9951],
    );
    b.add_equilibrium(
        Species::mineral("Calcite").with_molecular_weight(100.0869),
        &[("Ca++", 1.0), ("HCO3-", 1.0), ("H+", -1.0)],
        &[1.8487],
    );
    b.add_equilibrium(
        Species::gas("CO2(g)"),
        &[("H2O", -1.0), ("H+", 1.0), ("HCO3-", 1.0)],
        &[-7.8136],
    );
    b.build().unwrap()
}

fn setup() -> SystemSetup {
    SystemSetup::at_25c("H+")
        .with_constraint("H2O", Constraint::KgSolventWater(1.0))
        .with_constraint("H+", Constraint::BulkMolesSpecies(1e-2))
        .with_constraint("HCO3-", Constraint::BulkMolesSpecies(5e-3))
        .with_constraint("Ca++", Constraint::BulkMolesSpecies(1e-3))
        .with_constraint("O2(g)", Constraint::Fugacity(0.2))
}

#[test]
fn illegal_swaps_are_refused() {
    let mut db = db();
    let mut activity = DebyeHuckelBdot::new(DebyeHuckelParams::default()).unwrap();
    let mut ionic = IonicStrengthCalculator::default();
    let swapper = SpeciesSwapper::default();
    let mut system =
        EquilibriumSystem::new(&mut db, &mut activity, &mut ionic, &swapper, setup()).unwrap();

    let err = system.perform_swap(0, 2).unwrap_err();
    assert!(matches!(err, SystemError::IllegalSwap { .. }));
    assert!(err.to_string().contains("swap out water and replace it by OH-"));
    assert!(err.to_string().contains("choose a different charge-balance species"));

    let err = system.perform_swap(1, 2).unwrap_err();
    assert!(err.to_string().contains("charge-balance species out of the basis"));
    let err = system.perform_swap(4, 0).unwrap_err();
    assert!(err.to_string().contains("swap a gas out of the basis"));
    let err = system.perform_swap(2, 4).unwrap_err();
    assert!(err.to_string().contains("swap a gas into the basis"));

    assert!(matches!(
        system.perform_swap(5, 0),
        Err(SystemError::IndexOutOfRange { .. })
    ));
    assert!(matches!(
        system.perform_swap(2, 5),
        Err(SystemError::IndexOutOfRange { .. })
    ));

    // CaOH+ does not involve HCO3-
    let err = system.perform_swap(2, 1).unwrap_err();
    assert!(matches!(err, SystemError::Swap(_)));
    assert_eq!(system.database().basis_species(2).name, "HCO3-");
}

#[test]
fn aqueous_swap_carries_state_over() {
    let mut db = db();
    let mut activity = DebyeHuckelBdot::new(DebyeHuckelParams::default()).unwrap();
    let mut ionic = IonicStrengthCalculator::default();
    let swapper = SpeciesSwapper::default();
    let mut system =
        EquilibriumSystem::new(&mut db, &mut activity, &mut ionic, &swapper, setup()).unwrap();

    let m_co2 = system.eqm_molality(0).unwrap();
    let charge_before = system.total_charge();
    system.perform_swap(2, 0).unwrap();

    assert_eq!(system.database().basis_species(2).name, "CO2(aq)");
    assert_eq!(system.database().equilibrium_species(0).name, "HCO3-");
    assert_eq!(system.basis_molality()[2], m_co2);
    assert!(matches!(system.constraints()[2], Constraint::BulkMolesSpecies(_)));
    // H+ is still the charge-balance species and still balances exactly
    assert_eq!(system.charge_balance_species(), "H+");
    assert!(system.total_charge().abs() < 1e-15);
    assert!(charge_before.abs() < 1e-15);
    // bulk carbon is unchanged, H+ has taken up the bicarbonate's charge
    assert!((system.bulk_moles()[2] - 5e-3).abs() < 1e-15);
    assert!((system.bulk_moles()[1] + 2e-3).abs() < 1e-15);
    assert!(system.num_in_algebraic_system() == 3);

    // round trip
    system.perform_swap(2, 0).unwrap();
    assert_eq!(system.database().basis_species(2).name, "HCO3-");
    assert!((system.bulk_moles()[2] - 5e-3).abs() < 1e-15);
    assert!((system.bulk_moles()[1] - 3e-3).abs() < 1e-15);
    assert!(system.basis_molality()[2] > 0.0);
}

#[test]
fn mineral_swap_fixes_activity_and_leaves_algebraic_system() {
    let mut db = db();
    let mut activity = DebyeHuckelBdot::new(DebyeHuckelParams::default()).unwrap();
    let mut ionic = IonicStrengthCalculator::default();
    let swapper = SpeciesSwapper::default();
    let mut system =
        EquilibriumSystem::new(&mut db, &mut activity, &mut ionic, &swapper, setup()).unwrap();
    let calcite = system.database().equilibrium_index_of("Calcite").unwrap();
    assert_eq!(system.num_in_algebraic_system(), 3);

    system.perform_swap(3, calcite).unwrap();
    assert_eq!(system.database().basis_species(3).name, "Calcite");
    assert!(system.basis_activity_known()[3]);
    assert_eq!(system.basis_activities()[3], 1.0);
    assert_eq!(system.num_in_algebraic_system(), 2);
    assert!(!system.layout().is_algebraic(3));
    // calcium bulk now counts as calcite
    assert!((system.bulk_moles()[3] - 1e-3).abs() < 1e-15);
    assert!((system.bulk_moles()[2] - 4e-3).abs() < 1e-15);
    let ca = system.database().equilibrium_index_of("Ca++").unwrap();
    assert!(system.eqm_molality(ca).unwrap() > 0.0);
}

/// Whether `perform_swap(out, into)` on a fresh system should be accepted.
fn swap_is_legal(db: &ModelDatabase, out: usize, into: usize) -> bool {
    let basis = db.basis_species(out);
    let eqm = db.equilibrium_species(into);
    out != 0 && basis.name != "H+" && !basis.is_gas() && !eqm.is_gas() && db.stoich(into, out) != 0.0
}

proptest! {
    #[test]
    fn swap_legality_matches_rules(out in 0usize..5, into in 0usize..5) {
        let mut db = db();
        let reference = db.clone();
        let mut activity = DebyeHuckelBdot::new(DebyeHuckelParams::default()).unwrap();
        let mut ionic = IonicStrengthCalculator::default();
        let swapper = SpeciesSwapper::default();
        let mut system =
            EquilibriumSystem::new(&mut db, &mut activity, &mut ionic, &swapper, setup()).unwrap();
        let result = system.perform_swap(out, into);
        prop_assert_eq!(result.is_ok(), swap_is_legal(&reference, out, into));
        prop_assert!(system.total_charge().abs() < 1e-14);
    }
}
