//! Residual and analytic Jacobian of the algebraic system.
//!
//! The Jacobian ignores derivatives of activity coefficients and of the water
//! activity. Only species with unknown molality are in the algebraic system,
//! so equilibrium molalities depend on each unknown through `(γ m)^ν` alone.

use ge_core::constants::MOLES_PER_KG_WATER;
use nalgebra::{DMatrix, DVector};

use crate::constraint::Constraint;
use crate::error::{SystemError, SystemResult};
use crate::system::EquilibriumSystem;

impl EquilibriumSystem<'_> {
    /// Residual of algebraic slot `a`.
    pub fn residual_component(&self, a: usize) -> SystemResult<f64> {
        let n = self.layout.len();
        if a >= n {
            return Err(SystemError::IndexOutOfRange {
                what: "residual for algebraic index",
                index: a,
                len: n,
            });
        }
        let nba = self.layout.num_basis_in_algebraic();
        if a < nba {
            Ok(self.basis_residual(self.layout.basis_of(a)))
        } else {
            Ok(self.surface_residual(a - nba))
        }
    }

    fn basis_residual(&self, i: usize) -> f64 {
        let nw = self.basis_molality[0];
        let cb = self.charge_balance_index;
        let mut res = if i == 0 {
            -self.bulk_moles[0] + nw * MOLES_PER_KG_WATER
        } else if i == cb {
            nw * self.basis_molality[i] + self.charge_balance_bulk_term(|_| true)
        } else {
            -self.bulk_moles[i] + nw * self.basis_molality[i]
        };
        res += nw * self.eqm_sum(i);
        res
    }

    /// `Σ_{k≠cb, z_k≠0, include(k)} z_k bulk_k / z_cb`
    fn charge_balance_bulk_term(&self, include: impl Fn(usize) -> bool) -> f64 {
        let cb = self.charge_balance_index;
        let z_cb = self.db.basis_species(cb).charge;
        self.db
            .basis()
            .iter()
            .enumerate()
            .filter(|&(k, species)| k != cb && species.is_charged() && include(k))
            .map(|(k, species)| species.charge * self.bulk_moles[k] / z_cb)
            .sum()
    }

    fn surface_residual(&self, s: usize) -> f64 {
        let nw = self.basis_molality[0];
        let psi = self.surface_pot_expr[s];
        let mut res = self.surface_pot_prefactor(s) * (psi - 1.0 / psi);
        for j in self.surface_species(s) {
            res += nw * self.db.equilibrium_species(j).charge * self.eqm_molality[j];
        }
        res
    }

    /// Residual of every algebraic slot.
    pub fn residual(&self) -> DVector<f64> {
        let nba = self.layout.num_basis_in_algebraic();
        DVector::from_iterator(
            self.layout.len(),
            (0..self.layout.len()).map(|a| {
                if a < nba {
                    self.basis_residual(self.layout.basis_of(a))
                } else {
                    self.surface_residual(a - nba)
                }
            }),
        )
    }

    /// Analytic (approximate) Jacobian `d residual_a / d x_b`.
    ///
    /// `residual` must be the residual at the current state.
    pub fn jacobian(&self, residual: &DVector<f64>) -> DMatrix<f64> {
        let n = self.layout.len();
        let nba = self.layout.num_basis_in_algebraic();
        let ne = self.num_equilibrium();
        let nw = self.basis_molality[0];
        let cb = self.charge_balance_index;
        let z_cb = self.db.basis_species(cb).charge;
        let mut jac = DMatrix::zeros(n, n);

        // basis rows, basis columns
        for a in 0..nba {
            let basis_a = self.layout.basis_of(a);
            for b in 0..nba {
                let basis_b = self.layout.basis_of(b);
                if basis_b == 0 {
                    // solvent mass is the unknown
                    jac[(a, b)] += if basis_a != cb {
                        (residual[a] + self.bulk_moles[basis_a]) / nw
                    } else {
                        // bulk moles of free-molality or activity constrained species are
                        // linear in nw already, so only algebraic species appear here
                        let extra = self.charge_balance_bulk_term(|k| self.layout.is_algebraic(k));
                        (residual[a] - extra) / nw
                    };
                    continue;
                }

                if a == b {
                    jac[(a, b)] += nw;
                }
                let m_b = self.basis_molality[basis_b];
                for j in 0..ne {
                    jac[(a, b)] += nw
                        * self.db.stoich(j, basis_a)
                        * self.eqm_molality[j]
                        * self.db.stoich(j, basis_b)
                        / m_b;
                }
                if basis_a == cb {
                    for (k, species) in self.db.basis().iter().enumerate() {
                        let fixed_free = matches!(
                            self.constraints[k],
                            Constraint::Activity(_) | Constraint::FreeMolality(_)
                        );
                        if k == cb || !species.is_charged() || !fixed_free {
                            continue;
                        }
                        let prefactor = species.charge * nw / z_cb;
                        for j in 0..ne {
                            jac[(a, b)] += prefactor
                                * self.db.stoich(j, k)
                                * self.eqm_molality[j]
                                * self.db.stoich(j, basis_b)
                                / m_b;
                        }
                    }
                }
            }
        }

        // basis rows, surface columns
        for a in 0..nba {
            let basis_a = self.layout.basis_of(a);
            for s in 0..self.layout.num_surfaces() {
                let b = nba + s;
                let psi = self.surface_pot_expr[s];
                for j in self.surface_species(s) {
                    jac[(a, b)] += nw
                        * self.db.stoich(j, basis_a)
                        * 2.0
                        * self.db.equilibrium_species(j).charge
                        * self.eqm_molality[j]
                        / psi;
                }
            }
        }

        // surface rows
        for s in 0..self.layout.num_surfaces() {
            let a = nba + s;
            let psi = self.surface_pot_expr[s];
            for b in 0..nba {
                let basis_b = self.layout.basis_of(b);
                for j in self.surface_species(s) {
                    let z = self.db.equilibrium_species(j).charge;
                    jac[(a, b)] += if basis_b == 0 {
                        z * self.eqm_molality[j]
                    } else {
                        nw * z * self.eqm_molality[j] * self.db.stoich(j, basis_b)
                            / self.basis_molality[basis_b]
                    };
                }
            }
            jac[(a, a)] += self.surface_pot_prefactor(s) * (1.0 + 1.0 / (psi * psi));
            for j in self.surface_species(s) {
                let z = self.db.equilibrium_species(j).charge;
                jac[(a, a)] += nw * z * z * 2.0 * self.eqm_molality[j] / psi;
            }
        }

        jac
    }
}
