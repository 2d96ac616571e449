//! The analytic Jacobian against central differences of the residual.

use ge_activity::{IdealActivity, IonicStrengthCalculator};
use ge_database::{DatabaseBuilder, ModelDatabase, Species, SpeciesSwapper};
use ge_solver::jacobian::central_difference_jacobian;
use ge_solver::{EquilibriumSolver, JacobianMode, SolverConfig, SolverResult};
use ge_system::{Constraint, EquilibriumSystem, SystemSetup};
use nalgebra::DVector;

fn carbonate_db() -> ModelDatabase {
    let mut b = DatabaseBuilder::new(vec![25.0]);
    b.add_basis(Species::aqueous("H2O", 0.0).with_molecular_weight(18.0152));
    b.add_basis(Species::aqueous("H+", 1.0));
    b.add_basis(Species::aqueous("HCO3-", -1.0));
    b.add_basis(Species::aqueous("Ca++", 2.0));
    b.add_equilibrium(
        Species::aqueous("CO2(aq)", 0.0),
        &[("H2O", -1.0), ("H+", 1.0), ("HCO3-", 1.0)],
        &[-6.3447],
    );
    b.add_equilibrium(
        Species::aqueous("CO3--", -2.0),
        &[("HCO3-", 1.0), ("H+", -1.0)],
        &[10.3288],
    );
    b.add_equilibrium(
        Species::aqueous("CaHCO3+", 1.0),
        &[("Ca++", 1.0), ("HCO3-", 1.0)],
        &[-1.0467],
    );
    b.add_equilibrium(
        Species::aqueous("OH-", -1.0),
        &[("H2O", 1.0), ("H+", -1.0)],
        &[13.9951],
    );
    b.build().unwrap()
}

fn setup() -> SystemSetup {
    SystemSetup::at_25c("HCO3-")
        .with_constraint("H2O", Constraint::BulkMolesWater(55.6))
        .with_constraint("H+", Constraint::BulkMolesSpecies(1e-3))
        .with_constraint("HCO3-", Constraint::BulkMolesSpecies(0.0))
        .with_constraint("Ca++", Constraint::BulkMolesSpecies(0.01))
}

#[test]
fn analytic_jacobian_matches_central_differences() {
    let mut db = carbonate_db();
    let mut activity = IdealActivity;
    let mut ionic = IonicStrengthCalculator::default();
    let swapper = SpeciesSwapper::default();
    let mut system =
        EquilibriumSystem::new(&mut db, &mut activity, &mut ionic, &swapper, setup()).unwrap();
    assert_eq!(system.num_in_algebraic_system(), 4);

    let residual = system.residual();
    let analytic = system.jacobian(&residual);
    let x = system.algebraic_values();
    let numeric = central_difference_jacobian(
        &x,
        |v: &DVector<f64>| -> SolverResult<DVector<f64>> {
            system.set_algebraic_variables(v.as_slice())?;
            Ok(system.residual())
        },
        1e-6,
    )
    .unwrap();

    for a in 0..analytic.nrows() {
        let scale = analytic.row(a).amax();
        for b in 0..analytic.ncols() {
            let diff = (analytic[(a, b)] - numeric[(a, b)]).abs();
            assert!(
                diff <= 1e-6 * scale,
                "entry ({a}, {b}): analytic {} numeric {}",
                analytic[(a, b)],
                numeric[(a, b)]
            );
        }
    }
}

#[test]
fn finite_difference_modes_reach_the_same_state() {
    let solve = |mode: JacobianMode| {
        let mut db = carbonate_db();
        let mut activity = IdealActivity;
        let mut ionic = IonicStrengthCalculator::default();
        let swapper = SpeciesSwapper::default();
        let mut system =
            EquilibriumSystem::new(&mut db, &mut activity, &mut ionic, &swapper, setup()).unwrap();
        let config = SolverConfig {
            abs_tol: 1e-12,
            jacobian: mode,
            ramp_max_ionic_strength: 0,
            ..SolverConfig::default()
        };
        let report = EquilibriumSolver::new(config)
            .unwrap()
            .solve_system(&mut system)
            .unwrap();
        assert!(report.converged);
        system.basis_molality().to_vec()
    };

    let analytic = solve(JacobianMode::Analytic);
    for mode in [JacobianMode::ForwardDifference, JacobianMode::CentralDifference] {
        let numeric = solve(mode);
        for (a, n) in analytic.iter().zip(&numeric) {
            assert!((a - n).abs() <= 1e-7 * a.abs(), "{mode:?}: {a} vs {n}");
        }
    }
}
