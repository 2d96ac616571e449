//! Solver configuration.

use crate::error::{SolverError, SolverResult};

/// How the Newton Jacobian is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JacobianMode {
    /// Approximate analytic Jacobian from the system
    #[default]
    Analytic,
    ForwardDifference,
    /// Twice the residual evaluations of forward differences
    CentralDifference,
}

/// Newton solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Absolute tolerance on the L1 residual
    pub abs_tol: f64,
    /// Tolerance on the L1 residual relative to the initial one
    pub rel_tol: f64,
    /// Maximum Newton iterations per basis configuration
    pub max_iter: usize,
    /// Initial residuals above this trigger residual reduction
    pub max_initial_residual: f64,
    /// Molality below which a basis species may be swapped out [mol/kg]
    pub swap_threshold: f64,
    pub max_swaps_allowed: usize,
    /// Minerals that may never be swapped into the basis
    pub prevent_precipitation: Vec<String>,
    pub max_ionic_strength: f64,
    /// Newton iterations over which the ionic-strength cap ramps to its maximum
    pub ramp_max_ionic_strength: usize,
    pub jacobian: JacobianMode,
    /// Relative step for finite-difference Jacobians
    pub fd_epsilon: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            abs_tol: 1e-10,
            rel_tol: 1e-200,
            max_iter: 100,
            max_initial_residual: 1e3,
            swap_threshold: 0.1,
            max_swaps_allowed: 20,
            prevent_precipitation: Vec::new(),
            max_ionic_strength: 3.0,
            ramp_max_ionic_strength: 20,
            jacobian: JacobianMode::Analytic,
            fd_epsilon: 1e-7,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> SolverResult<()> {
        if self.ramp_max_ionic_strength >= self.max_iter {
            return Err(SolverError::config(
                "ramp_max_ionic_strength must be less than max_iter",
            ));
        }
        check_max_initial_residual(self.max_initial_residual)?;
        if self.max_ionic_strength.is_nan() || self.max_ionic_strength < 0.0 {
            return Err(SolverError::config("max_ionic_strength must not be negative"));
        }
        if self.rel_tol.is_nan() || self.rel_tol < 0.0 {
            return Err(SolverError::config("rel_tol must not be negative"));
        }
        if self.abs_tol.is_nan() || self.abs_tol < 0.0 {
            return Err(SolverError::config("abs_tol must not be negative"));
        }
        if self.rel_tol == 0.0 && self.abs_tol == 0.0 {
            return Err(SolverError::config(
                "either rel_tol or abs_tol must be positive",
            ));
        }
        if self.swap_threshold.is_nan() || self.swap_threshold < 0.0 {
            return Err(SolverError::config("swap_threshold must not be negative"));
        }
        if !(self.fd_epsilon > 0.0 && self.fd_epsilon < 1.0) {
            return Err(SolverError::config(format!(
                "fd_epsilon must lie in (0, 1): you entered {}",
                self.fd_epsilon
            )));
        }
        Ok(())
    }

    /// Ionic-strength cap increment per Newton iteration.
    pub fn ionic_strength_step(&self) -> f64 {
        self.max_ionic_strength / (1.0 + self.ramp_max_ionic_strength as f64)
    }
}

pub(crate) fn check_max_initial_residual(value: f64) -> SolverResult<()> {
    if value.is_nan() || value <= 0.0 {
        return Err(SolverError::config("max_initial_residual must be positive"));
    }
    Ok(())
}
