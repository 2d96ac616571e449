//! High-level solver interface.

use ge_core::{ensure_finite, l1_norm};
use ge_system::EquilibriumSystem;
use nalgebra::DVector;
use tracing::{debug, info, warn};

use crate::config::{SolverConfig, check_max_initial_residual};
use crate::error::{SolverError, SolverResult};
use crate::jacobian::system_jacobian;
use crate::newton::{newton_step, underrelax};
use crate::residual_reduction::{reduce_initial_residual, reduction_budget};
use crate::swap_decision::swap_needed;

/// Outcome of a successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    /// Human-readable log of iterations, swaps and warnings
    pub trace: String,
    /// Newton iterations summed over every basis configuration
    pub iterations: usize,
    /// Final L1 residual
    pub residual: f64,
    pub swaps: usize,
    /// Whether the last Newton loop met a tolerance
    pub converged: bool,
}

struct NewtonOutcome {
    iterations: usize,
    residual: f64,
    converged: bool,
}

/// Newton solver for an `EquilibriumSystem`, with automatic basis swaps.
#[derive(Debug, Clone)]
pub struct EquilibriumSolver {
    config: SolverConfig,
}

impl EquilibriumSolver {
    pub fn new(config: SolverConfig) -> SolverResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn max_initial_residual(&self) -> f64 {
        self.config.max_initial_residual
    }

    pub fn set_max_initial_residual(&mut self, value: f64) -> SolverResult<()> {
        check_max_initial_residual(value)?;
        self.config.max_initial_residual = value;
        Ok(())
    }

    /// Drive `system` to equilibrium.
    ///
    /// Repeats: reduce a large initial residual, run Newton, then ask whether
    /// the basis should change. Each swap restarts the loop. On error the
    /// system is left in whatever state the failing step produced.
    pub fn solve_system(&self, system: &mut EquilibriumSystem<'_>) -> SolverResult<SolveReport> {
        let mut trace = String::new();
        let mut iterations = 0;
        let mut swaps = 0;

        loop {
            let outcome = self.solve_current_basis(system, &mut trace)?;
            iterations += outcome.iterations;

            let Some(proposal) = swap_needed(system, &self.config, outcome.converged)? else {
                info!(
                    iterations,
                    residual = outcome.residual,
                    swaps,
                    converged = outcome.converged,
                    "equilibrium solve finished"
                );
                return Ok(SolveReport {
                    trace,
                    iterations,
                    residual: outcome.residual,
                    swaps,
                    converged: outcome.converged,
                });
            };

            swaps += 1;
            if swaps > self.config.max_swaps_allowed {
                return Err(SolverError::TooManySwaps {
                    swaps,
                    max: self.config.max_swaps_allowed,
                });
            }

            let db = system.database();
            let out_name = db.basis_species(proposal.out_of_basis).name.clone();
            let in_name = db.equilibrium_species(proposal.into_basis).name.clone();
            trace.push_str(&format!(
                "Swap {swaps}: {out_name} out of the basis, {in_name} in ({:?})\n",
                proposal.reason
            ));
            info!(swap = swaps, out = %out_name, into = %in_name, reason = ?proposal.reason, "basis swap");
            system.perform_swap(proposal.out_of_basis, proposal.into_basis)?;
        }
    }

    /// Newton iterations for the current basis.
    fn solve_current_basis(
        &self,
        system: &mut EquilibriumSystem<'_>,
        trace: &mut String,
    ) -> SolverResult<NewtonOutcome> {
        let config = &self.config;
        let step = config.ionic_strength_step();
        let mut cap = step;
        system.set_max_ionic_strengths(cap, cap);

        let mut residual = system.residual();
        let mut norm = residual_norm(&residual)?;

        if norm > config.max_initial_residual {
            let before = norm;
            let rounds = reduction_budget(system, norm, config.max_initial_residual);
            let mut done = 0;
            while done < rounds && reduce_initial_residual(system, config.max_initial_residual)? {
                done += 1;
            }
            residual = system.residual();
            norm = residual_norm(&residual)?;
            trace.push_str(&format!(
                "Initial residual reduced from {before:e} to {norm:e} in {done} rounds\n"
            ));
            debug!(from = before, to = norm, rounds = done, "initial residual reduction");
        }

        let initial = norm;
        let mut iter = 0;
        while (norm >= config.rel_tol * initial && norm >= config.abs_tol && iter < config.max_iter)
            || iter < config.ramp_max_ionic_strength
        {
            let delta = if residual.is_empty() {
                DVector::zeros(0)
            } else {
                let jac = system_jacobian(system, &residual, config.jacobian, config.fd_epsilon)?;
                newton_step(jac, &residual)?
            };
            let next = underrelax(&system.algebraic_values(), &delta);
            system.set_algebraic_variables(next.as_slice())?;

            if system.alter_charge_balance_species(config.swap_threshold) {
                trace.push_str(&format!(
                    "Changed the charge-balance species to {}\n",
                    system.charge_balance_species()
                ));
            }

            cap = (cap + step).min(config.max_ionic_strength);
            system.set_max_ionic_strengths(cap, cap);

            residual = system.residual();
            norm = residual_norm(&residual)?;
            iter += 1;
            trace.push_str(&format!("iter = {iter} |R| = {norm:e}\n"));
            debug!(iteration = iter, residual = norm, ionic_strength_cap = cap, "newton iteration");
        }

        system.enforce_charge_balance();

        if iter >= config.max_iter {
            trace.push_str(&format!(
                "Warning: Number of iterations exceeds {}; residual is {norm:e}\n",
                config.max_iter
            ));
            warn!(iterations = iter, residual = norm, "newton iteration limit reached");
        }

        Ok(NewtonOutcome {
            iterations: iter,
            residual: norm,
            converged: norm < config.abs_tol || norm < config.rel_tol * initial,
        })
    }
}

fn residual_norm(residual: &DVector<f64>) -> SolverResult<f64> {
    Ok(ensure_finite(l1_norm(residual.as_slice()), "L1 residual")?)
}
