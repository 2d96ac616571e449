//! Basis swaps on a live system.

use nalgebra::DVector;
use tracing::debug;

use crate::algebraic::AlgebraicLayout;
use crate::constraint::Constraint;
use crate::error::{SystemError, SystemResult};
use crate::system::EquilibriumSystem;

impl EquilibriumSystem<'_> {
    /// Swap basis species `out` for equilibrium species `into`.
    ///
    /// Bulk compositions are re-expressed in the new basis and molalities are
    /// carried over so the state stays close to the pre-swap one. Water, the
    /// charge-balance species and gases may not be swapped.
    pub fn perform_swap(&mut self, out: usize, into: usize) -> SystemResult<()> {
        if out >= self.num_basis() {
            return Err(SystemError::IndexOutOfRange {
                what: "basis species",
                index: out,
                len: self.num_basis(),
            });
        }
        if into >= self.num_equilibrium() {
            return Err(SystemError::IndexOutOfRange {
                what: "equilibrium species",
                index: into,
                len: self.num_equilibrium(),
            });
        }
        let into_name = self.db.equilibrium_species(into).name.clone();
        if out == 0 {
            return Err(SystemError::IllegalSwap {
                what: format!(
                    "attempting to swap out water and replace it by {into_name}. This could be because the algorithm would like to swap out the charge-balance species, in which case you should choose a different charge-balance species"
                ),
            });
        }
        if out == self.charge_balance_index {
            return Err(SystemError::IllegalSwap {
                what: "attempting to swap the charge-balance species out of the basis".into(),
            });
        }
        if self.db.basis_species(out).is_gas() {
            return Err(SystemError::IllegalSwap {
                what: "attempting to swap a gas out of the basis".into(),
            });
        }
        if self.db.equilibrium_species(into).is_gas() {
            return Err(SystemError::IllegalSwap {
                what: "attempting to swap a gas into the basis".into(),
            });
        }
        let out_name = self.db.basis_species(out).name.clone();

        let mut bm = DVector::from_column_slice(&self.bulk_moles);
        self.swapper
            .swap_with_bulk(&mut *self.db, &mut bm, out, into)?;

        // the species now at `out` has fixed bulk moles, whatever was fixed before
        self.constraints[out] = Constraint::BulkMolesSpecies(bm[out]);
        for i in 0..self.num_basis() {
            if matches!(
                self.constraints[i],
                Constraint::BulkMolesSpecies(_) | Constraint::BulkMolesWater(_)
            ) {
                self.set_constraint_value(i, bm[i]);
                self.original_values[i] = bm[i];
            }
        }

        // a mineral or gas has no equilibrium molality to carry over, so guess one;
        // a zero molality would start the new unknown outside the positive domain
        let new_basis = self.db.basis_species(out);
        let swapped_in = if new_basis.is_mineral() || new_basis.is_gas() || self.eqm_molality[into] == 0.0
        {
            (0.9 * bm[out]).max(self.min_initial_molality)
        } else {
            self.eqm_molality[into]
        };
        let swapped_out = self.basis_molality[out];
        self.basis_molality[out] = swapped_in;
        // free moles of a consumed mineral can be negative
        self.eqm_molality[into] = swapped_out.max(0.0);

        self.build_known_basis_activities();
        self.build_temperature_dependent_quantities();
        self.charge_balance_index = self
            .db
            .basis_index_of(&self.charge_balance_species)
            .ok_or_else(|| SystemError::InvalidState {
                what: format!(
                    "charge-balance species {} left the basis during a swap",
                    self.charge_balance_species
                ),
            })?;
        self.enforce_charge_balance_if_simple();
        self.layout = AlgebraicLayout::build(&*self.db, &self.constraints);
        self.compute_consistent_configuration();

        debug!(
            out = %out_name,
            into = %into_name,
            num_algebraic = self.layout.len(),
            "basis swap performed"
        );
        Ok(())
    }
}
