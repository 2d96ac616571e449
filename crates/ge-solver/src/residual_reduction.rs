//! Heuristic reduction of a large initial residual.
//!
//! Newton from a poor starting point tends to creep. Before iterating, basis
//! unknowns with large residual components are halved or doubled one at a
//! time, keeping any change that lowers the L1 residual.

use ge_core::{l1_norm, median};
use ge_system::EquilibriumSystem;
use tracing::debug;

use crate::error::SolverResult;

/// Upper bound on reduction rounds: `nb * ceil(ln(r0 / cap) / ln 1.1)`.
pub fn max_reduction_rounds(num_basis: usize, initial_residual: f64, cap: f64) -> usize {
    if initial_residual.is_nan() || initial_residual <= cap {
        return 0;
    }
    let rounds = (initial_residual / cap).ln() / 1.1f64.ln();
    num_basis.saturating_mul(rounds.ceil() as usize)
}

/// Round budget for `system`, scaled by its full basis size.
pub(crate) fn reduction_budget(
    system: &EquilibriumSystem<'_>,
    initial_residual: f64,
    cap: f64,
) -> usize {
    max_reduction_rounds(system.num_basis(), initial_residual, cap)
}

/// One round of the heuristic.
///
/// Returns true if some unknown was changed. The system is left either
/// improved or untouched.
pub fn reduce_initial_residual(system: &mut EquilibriumSystem<'_>, cap: f64) -> SolverResult<bool> {
    let nba = system.num_basis_in_algebraic_system();
    if nba == 0 {
        return Ok(false);
    }
    let residual = system.residual();
    let current = l1_norm(residual.as_slice());

    let mut order: Vec<usize> = (0..nba).filter(|&a| residual[a].abs() > cap).collect();
    order.sort_by(|&a, &b| residual[b].abs().total_cmp(&residual[a].abs()));
    if order.is_empty() {
        return Ok(false);
    }

    let mut values = system.algebraic_values();
    let Some(typical) = median(&values.as_slice()[..nba]) else {
        return Ok(false);
    };

    for a in order {
        let original = values[a];
        let factors = if original > typical {
            [0.5, 2.0]
        } else {
            [2.0, 0.5]
        };
        for factor in factors {
            values[a] = original * factor;
            system.set_algebraic_variables(values.as_slice())?;
            let trial = l1_norm(system.residual().as_slice());
            if trial < current {
                debug!(slot = a, factor, from = current, to = trial, "initial residual reduced");
                return Ok(true);
            }
        }
        values[a] = original;
        system.set_algebraic_variables(values.as_slice())?;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ge_activity::{IdealActivity, IonicStrengthCalculator};
    use ge_database::{DatabaseBuilder, Species, SpeciesSwapper};
    use ge_system::{Constraint, SystemSetup};

    #[test]
    fn budget_counts_every_basis_species() {
        let mut b = DatabaseBuilder::new(vec![25.0]);
        b.add_basis(Species::aqueous("H2O", 0.0).with_molecular_weight(18.0152));
        b.add_basis(Species::aqueous("H+", 1.0));
        b.add_basis(Species::aqueous("Cl-", -1.0));
        b.add_equilibrium(
            Species::aqueous("OH-", -1.0),
            &[("H2O", 1.0), ("H+", -1.0)],
            &[13.9951],
        );
        let mut db = b.build().unwrap();
        let mut activity = IdealActivity;
        let mut ionic = IonicStrengthCalculator::default();
        let swapper = SpeciesSwapper::default();
        let setup = SystemSetup::at_25c("Cl-")
            .with_constraint("H2O", Constraint::KgSolventWater(1.0))
            .with_constraint("H+", Constraint::Activity(1e-4))
            .with_constraint("Cl-", Constraint::BulkMolesSpecies(1e-4));
        let system =
            EquilibriumSystem::new(&mut db, &mut activity, &mut ionic, &swapper, setup).unwrap();

        // only Cl- is an unknown, but all three basis species count
        assert_eq!(system.num_basis_in_algebraic_system(), 1);
        assert_eq!(reduction_budget(&system, 1e6, 10.0), 3 * 121);
        assert_eq!(reduction_budget(&system, 1.0, 10.0), 0);
    }

    #[test]
    fn round_count() {
        assert_eq!(max_reduction_rounds(2, 5.0, 10.0), 0);
        assert_eq!(max_reduction_rounds(2, 10.0, 10.0), 0);
        assert_eq!(max_reduction_rounds(3, 11.0, 10.0), 3);
        assert_eq!(max_reduction_rounds(2, 1e6, 10.0), 2 * 121);
        assert_eq!(max_reduction_rounds(1, f64::NAN, 10.0), 0);
    }
}
