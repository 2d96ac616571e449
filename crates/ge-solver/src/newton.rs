//! Newton step with positivity-preserving underrelaxation.

use nalgebra::{DMatrix, DVector};

use crate::error::{SolverError, SolverResult};

/// Raw Newton step: solves `jacobian * delta = residual`.
pub fn newton_step(jacobian: DMatrix<f64>, residual: &DVector<f64>) -> SolverResult<DVector<f64>> {
    jacobian
        .lu()
        .solve(residual)
        .ok_or_else(|| SolverError::Numeric {
            what: "Jacobian solve failed: matrix is singular".to_string(),
        })
}

/// Apply `x - delta / m` with `m = max(1, max_a 2 delta_a / x_a)`.
///
/// Every component of the result is at least half its current value.
pub fn underrelax(x: &DVector<f64>, delta: &DVector<f64>) -> DVector<f64> {
    let m = x
        .iter()
        .zip(delta.iter())
        .map(|(xa, da)| 2.0 * da / xa)
        .fold(1.0_f64, f64::max);
    x - delta / m
}
