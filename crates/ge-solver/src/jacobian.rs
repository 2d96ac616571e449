//! Finite difference Jacobian computation.
//!
//! The unknowns are strictly positive and span many decades, so steps are
//! relative: column j is perturbed by `epsilon * x[j]`.

use ge_system::EquilibriumSystem;
use nalgebra::{DMatrix, DVector};

use crate::config::JacobianMode;
use crate::error::SolverResult;

/// Forward differences: column j is `(f(x + dx e_j) - f(x)) / dx`.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    mut f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let f_x = f(x)?;
    let mut jac = DMatrix::zeros(f_x.len(), n);

    for j in 0..n {
        let dx = epsilon * x[j].abs();
        let mut x_perturbed = x.clone();
        x_perturbed[j] += dx;
        let df = (f(&x_perturbed)? - &f_x) / dx;
        jac.set_column(j, &df);
    }

    Ok(jac)
}

/// Central differences (second order, twice the evaluations).
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    mut f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let m = f(x)?.len();
    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let dx = epsilon * x[j].abs();

        let mut x_plus = x.clone();
        x_plus[j] += dx;
        let f_plus = f(&x_plus)?;

        let mut x_minus = x.clone();
        x_minus[j] -= dx;
        let f_minus = f(&x_minus)?;

        jac.set_column(j, &((f_plus - f_minus) / (2.0 * dx)));
    }

    Ok(jac)
}

/// Jacobian of the system's residual at its current state.
///
/// Finite-difference modes perturb the system and restore it before returning.
pub(crate) fn system_jacobian(
    system: &mut EquilibriumSystem<'_>,
    residual: &DVector<f64>,
    mode: JacobianMode,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>> {
    if mode == JacobianMode::Analytic {
        return Ok(system.jacobian(residual));
    }

    let x = system.algebraic_values();
    let eval = |v: &DVector<f64>| -> SolverResult<DVector<f64>> {
        system.set_algebraic_variables(v.as_slice())?;
        Ok(system.residual())
    };
    let jac = match mode {
        JacobianMode::CentralDifference => central_difference_jacobian(&x, eval, epsilon),
        _ => finite_difference_jacobian(&x, eval, epsilon),
    };
    system.set_algebraic_variables(x.as_slice())?;
    jac
}
