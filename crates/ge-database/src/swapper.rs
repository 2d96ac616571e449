//! Basis swaps.
//!
//! Swapping basis species `o` for equilibrium species `e` rewrites every
//! reaction in terms of the new basis. With pivot `p = ν[e][o]`:
//!
//! - `ν'[j][i] = ν[j][i] - ν[j][o] ν[e][i] / p` and `ν'[j][o] = ν[j][o] / p` for `j != e`
//! - `ν'[e][o] = 1 / p` and `ν'[e][i] = -ν[e][i] / p` (the old basis species now lives at row `e`)
//! - `log10K'[j] = log10K[j] - ν[j][o] / p log10K[e]` and `log10K'[e] = -log10K[e] / p`
//! - bulk: `b'[i] = b[i] - ν[e][i] b[o] / p` and `b'[o] = b[o] / p`

use nalgebra::DVector;

use crate::database::ModelDatabase;
use crate::error::{SwapError, SwapResult};

/// Exchanges a basis species with an equilibrium species.
pub trait BasisSwapper {
    /// Swap basis species `basis` out and equilibrium species `equilibrium` in.
    ///
    /// On error the database is unchanged.
    fn swap(&self, db: &mut ModelDatabase, basis: usize, equilibrium: usize) -> SwapResult<()>;

    /// As [`BasisSwapper::swap`], also re-expressing `bulk` (moles of each basis
    /// component) in terms of the new basis.
    fn swap_with_bulk(
        &self,
        db: &mut ModelDatabase,
        bulk: &mut DVector<f64>,
        basis: usize,
        equilibrium: usize,
    ) -> SwapResult<()>;

    /// Swap by species names.
    fn swap_by_name(
        &self,
        db: &mut ModelDatabase,
        basis_name: &str,
        equilibrium_name: &str,
    ) -> SwapResult<()> {
        let basis = db
            .basis_index_of(basis_name)
            .ok_or_else(|| SwapError::NotInBasis {
                name: basis_name.to_string(),
            })?;
        let equilibrium =
            db.equilibrium_index_of(equilibrium_name)
                .ok_or_else(|| SwapError::NotEquilibrium {
                    name: equilibrium_name.to_string(),
                })?;
        self.swap(db, basis, equilibrium)
    }
}

/// Stoichiometric pivot swapper.
#[derive(Debug, Clone, Copy)]
pub struct SpeciesSwapper {
    /// Pivots with magnitude below this are treated as singular
    pub tolerance: f64,
}

impl Default for SpeciesSwapper {
    fn default() -> Self {
        Self { tolerance: 1e-6 }
    }
}

impl SpeciesSwapper {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Check a proposed swap and return its pivot.
    pub fn check(&self, db: &ModelDatabase, basis: usize, equilibrium: usize) -> SwapResult<f64> {
        if basis == 0 {
            return Err(SwapError::Water);
        }
        if basis >= db.num_basis() {
            return Err(SwapError::BasisIndex { index: basis });
        }
        if equilibrium >= db.num_equilibrium() {
            return Err(SwapError::EquilibriumIndex { index: equilibrium });
        }
        let incoming = db.equilibrium_species(equilibrium);
        if incoming.is_surface_related() {
            return Err(SwapError::SurfaceSorption {
                name: incoming.name.clone(),
            });
        }
        let pivot = db.stoich(equilibrium, basis);
        if pivot.abs() < self.tolerance {
            return Err(SwapError::Singular {
                basis: db.basis_species(basis).name.clone(),
                equilibrium: incoming.name.clone(),
                pivot,
            });
        }
        Ok(pivot)
    }

    fn pivot(db: &mut ModelDatabase, o: usize, e: usize, p: f64) {
        let nb = db.num_basis();
        let row_e: Vec<f64> = (0..nb).map(|i| db.stoichiometry[(e, i)]).collect();
        let logk_e: Vec<f64> = (0..db.num_temperatures())
            .map(|t| db.log10k[(e, t)])
            .collect();

        for j in 0..db.num_equilibrium() {
            if j == e {
                continue;
            }
            let c = db.stoichiometry[(j, o)];
            if c == 0.0 {
                continue;
            }
            for (i, nu_e) in row_e.iter().enumerate() {
                if i != o {
                    db.stoichiometry[(j, i)] -= c * nu_e / p;
                }
            }
            db.stoichiometry[(j, o)] = c / p;
            for (t, k_e) in logk_e.iter().enumerate() {
                db.log10k[(j, t)] -= c / p * k_e;
            }
        }

        for r in 0..db.num_redox() {
            let c = db.redox_stoichiometry[(r, o)];
            if c == 0.0 {
                continue;
            }
            for (i, nu_e) in row_e.iter().enumerate() {
                if i != o {
                    db.redox_stoichiometry[(r, i)] -= c * nu_e / p;
                }
            }
            db.redox_stoichiometry[(r, o)] = c / p;
            for (t, k_e) in logk_e.iter().enumerate() {
                db.redox_log10k[(r, t)] -= c / p * k_e;
            }
        }

        for (i, nu_e) in row_e.iter().enumerate() {
            db.stoichiometry[(e, i)] = if i == o { 1.0 / p } else { -nu_e / p };
        }
        for (t, k_e) in logk_e.iter().enumerate() {
            db.log10k[(e, t)] = -k_e / p;
        }

        std::mem::swap(&mut db.basis[o], &mut db.equilibrium[e]);
        db.basis_index.remove(&db.equilibrium[e].name);
        db.equilibrium_index.remove(&db.basis[o].name);
        db.basis_index.insert(db.basis[o].name.clone(), o);
        db.equilibrium_index.insert(db.equilibrium[e].name.clone(), e);
    }
}

impl BasisSwapper for SpeciesSwapper {
    fn swap(&self, db: &mut ModelDatabase, basis: usize, equilibrium: usize) -> SwapResult<()> {
        let pivot = self.check(db, basis, equilibrium)?;
        Self::pivot(db, basis, equilibrium, pivot);
        Ok(())
    }

    fn swap_with_bulk(
        &self,
        db: &mut ModelDatabase,
        bulk: &mut DVector<f64>,
        basis: usize,
        equilibrium: usize,
    ) -> SwapResult<()> {
        if bulk.len() != db.num_basis() {
            return Err(SwapError::BulkSize {
                got: bulk.len(),
                expected: db.num_basis(),
            });
        }
        let pivot = self.check(db, basis, equilibrium)?;
        let b_out = bulk[basis];
        for i in 0..bulk.len() {
            if i == basis {
                bulk[i] = b_out / pivot;
            } else {
                bulk[i] -= db.stoich(equilibrium, i) * b_out / pivot;
            }
        }
        Self::pivot(db, basis, equilibrium, pivot);
        Ok(())
    }
}
