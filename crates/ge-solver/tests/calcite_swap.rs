//! Precipitation of calcite from a supersaturated Ca(HCO3)2 solution.

use ge_activity::{DebyeHuckelBdot, IonicStrengthCalculator};
use ge_database::{DatabaseBuilder, ModelDatabase, Species, SpeciesSwapper};
use ge_solver::{EquilibriumSolver, SolverConfig, SolverError};
use ge_system::{Constraint, EquilibriumSystem, SystemSetup};

fn carbonate_db() -> ModelDatabase {
    let mut b = DatabaseBuilder::new(vec![25.0]);
    b.add_basis(Species::aqueous("H2O", 0.0).with_molecular_weight(18.0152));
    b.add_basis(Species::aqueous("H+", 1.0).with_radius(9.0));
    b.add_basis(Species::aqueous("HCO3-", -1.0).with_radius(4.5));
    b.add_basis(Species::aqueous("Ca++", 2.0).with_radius(6.0));
    b.add_equilibrium(
        Species::aqueous("CO2(aq)", 0.0).with_radius(4.0),
        &[("H2O", -1.0), ("H+", 1.0), ("HCO3-", 1.0)],
        &[-6.3447],
    );
    b.add_equilibrium(
        Species::aqueous("CO3--", -2.0).with_radius(4.5),
        &[("HCO3-", 1.0), ("H+", -1.0)],
        &[10.3288],
    );
    b.add_equilibrium(
        Species::aqueous("CaCO3", 0.0).with_radius(4.0),
        &[("Ca++", 1.0), ("HCO3-", 1.0), ("H+", -1.0)],
        &[7.0017],
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
    b.build().unwrap()
}

fn setup() -> SystemSetup {
    SystemSetup::at_25c("H+")
        .with_constraint("H2O", Constraint::KgSolventWater(1.0))
        .with_constraint("H+", Constraint::BulkMolesSpecies(0.0))
        .with_constraint("HCO3-", Constraint::BulkMolesSpecies(0.02))
        .with_constraint("Ca++", Constraint::BulkMolesSpecies(0.01))
        .with_min_initial_molality(1e-9)
}

fn config() -> SolverConfig {
    SolverConfig {
        abs_tol: 1e-13,
        max_iter: 100,
        max_initial_residual: 1.0,
        max_swaps_allowed: 5,
        ramp_max_ionic_strength: 0,
        ..SolverConfig::default()
    }
}

#[test]
fn supersaturated_calcite_enters_the_basis() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut db = carbonate_db();
    let mut activity = DebyeHuckelBdot::default();
    let mut ionic = IonicStrengthCalculator::default();
    let swapper = SpeciesSwapper::default();
    let mut system =
        EquilibriumSystem::new(&mut db, &mut activity, &mut ionic, &swapper, setup()).unwrap();

    let report = EquilibriumSolver::new(config())
        .unwrap()
        .solve_system(&mut system)
        .unwrap();

    assert_eq!(report.swaps, 1);
    assert!(report.converged);
    assert!(report.residual < 1e-13);
    assert!(report.trace.contains("Swap 1: Ca++ out of the basis, Calcite in"));

    let db = system.database();
    assert_eq!(db.basis_species(3).name, "Calcite");
    assert!(db.equilibrium_index_of("Ca++").is_some());

    let free_calcite = system.basis_molality()[3];
    assert!(free_calcite > 0.0 && free_calcite < 0.01, "free calcite {free_calcite}");
    // calcium is conserved across the precipitate and the solution
    assert!((system.bulk_moles()[3] - 0.01).abs() < 1e-12);
    assert!(system.saturation_indices().iter().all(|si| *si <= 1e-9));
}

#[test]
fn prevented_precipitation_keeps_the_basis() {
    let mut db = carbonate_db();
    let mut activity = DebyeHuckelBdot::default();
    let mut ionic = IonicStrengthCalculator::default();
    let swapper = SpeciesSwapper::default();
    let mut system =
        EquilibriumSystem::new(&mut db, &mut activity, &mut ionic, &swapper, setup()).unwrap();

    let config = SolverConfig {
        prevent_precipitation: vec!["Calcite".to_string()],
        ..config()
    };
    let report = EquilibriumSolver::new(config)
        .unwrap()
        .solve_system(&mut system)
        .unwrap();

    assert_eq!(report.swaps, 0);
    assert!(report.converged);
    assert_eq!(system.database().basis_species(3).name, "Ca++");
    let calcite = system.database().equilibrium_index_of("Calcite").unwrap();
    assert!(system.saturation_indices()[calcite] > 0.0);
}

#[test]
fn swap_limit_is_an_error() {
    let mut db = carbonate_db();
    let mut activity = DebyeHuckelBdot::default();
    let mut ionic = IonicStrengthCalculator::default();
    let swapper = SpeciesSwapper::default();
    let mut system =
        EquilibriumSystem::new(&mut db, &mut activity, &mut ionic, &swapper, setup()).unwrap();

    let config = SolverConfig {
        max_swaps_allowed: 0,
        ..config()
    };
    let err = EquilibriumSolver::new(config)
        .unwrap()
        .solve_system(&mut system)
        .unwrap_err();
    assert_eq!(err, SolverError::TooManySwaps { swaps: 1, max: 0 });
}
