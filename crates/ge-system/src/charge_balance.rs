//! Electroneutrality: the charge-balance species and its bulk moles.

use tracing::info;

use crate::constraint::Constraint;
use crate::error::{SystemError, SystemResult};
use crate::system::EquilibriumSystem;

impl EquilibriumSystem<'_> {
    /// If every charged basis species has a bulk-moles constraint, set the
    /// charge-balance species' bulk so the total charge is exactly zero.
    pub(crate) fn enforce_charge_balance_if_simple(&mut self) {
        let mut total = 0.0;
        for (species, constraint) in self.db.basis().iter().zip(&self.constraints) {
            if !species.is_charged() {
                continue;
            }
            match constraint {
                Constraint::BulkMolesSpecies(v) => total += species.charge * v,
                _ => return,
            }
        }
        let cb = self.charge_balance_index;
        let z_cb = self.db.basis_species(cb).charge;
        total -= z_cb * self.constraints[cb].value();
        let v = -total / z_cb;
        self.set_constraint_value(cb, v);
        self.bulk_moles[cb] = v;
    }

    /// Shift the charge-balance species' bulk moles so the total charge is zero.
    pub fn enforce_charge_balance(&mut self) {
        let cb = self.charge_balance_index;
        let z_cb = self.db.basis_species(cb).charge;
        let v = self.constraints[cb].value() - self.total_charge() / z_cb;
        self.set_constraint_value(cb, v);
        self.bulk_moles[cb] = v;
    }

    /// Make basis species `index` the charge-balance species.
    ///
    /// The old charge-balance species gets its original bulk moles back.
    pub fn set_charge_balance_species(&mut self, index: usize) -> SystemResult<()> {
        if index >= self.num_basis() {
            return Err(SystemError::IndexOutOfRange {
                what: "basis species",
                index,
                len: self.num_basis(),
            });
        }
        let species = self.db.basis_species(index);
        if !species.is_charged() {
            return Err(SystemError::InvalidState {
                what: format!(
                    "Cannot enforce charge balance using {} because it has zero charge",
                    species.name
                ),
            });
        }
        if !matches!(self.constraints[index], Constraint::BulkMolesSpecies(_)) {
            return Err(SystemError::InvalidState {
                what: format!(
                    "Cannot enforce charge balance using {} because it is not constrained by bulk moles",
                    species.name
                ),
            });
        }
        let name = species.name.clone();

        let old = self.charge_balance_index;
        let restored = self.original_values[old];
        self.set_constraint_value(old, restored);
        self.bulk_moles[old] = restored;

        self.charge_balance_index = index;
        self.charge_balance_species = name;
        self.enforce_charge_balance_if_simple();
        Ok(())
    }

    /// If the charge-balance species' molality has dropped to `threshold` or
    /// below, hand charge balance to the charged bulk-constrained species with
    /// the largest molality, preferring opposite charge sign.
    ///
    /// Returns true if the charge-balance species changed.
    pub fn alter_charge_balance_species(&mut self, threshold: f64) -> bool {
        let cb = self.charge_balance_index;
        if self.basis_molality[cb] > threshold {
            return false;
        }
        let z_cb = self.db.basis_species(cb).charge;
        let mut best_opposite: Option<(usize, f64)> = None;
        let mut best_same: Option<(usize, f64)> = None;
        for (i, species) in self.db.basis().iter().enumerate() {
            let m = self.basis_molality[i];
            if i == cb
                || !matches!(self.constraints[i], Constraint::BulkMolesSpecies(_))
                || !species.is_charged()
                || m <= threshold
            {
                continue;
            }
            let best = if species.charge * z_cb < 0.0 {
                &mut best_opposite
            } else {
                &mut best_same
            };
            if best.is_none_or(|(_, b)| m > b) {
                *best = Some((i, m));
            }
        }

        let Some((index, _)) = best_opposite.or(best_same) else {
            return false;
        };
        let from = self.charge_balance_species.clone();
        // index is a charged bulk-constrained basis species, so this cannot fail
        if self.set_charge_balance_species(index).is_err() {
            return false;
        }
        info!(
            from = %from,
            to = %self.charge_balance_species,
            threshold,
            "charge-balance species changed"
        );
        true
    }

    /// Hand charge balance back to the species chosen at construction.
    ///
    /// Returns false if it already has it, or if it has left the basis.
    pub fn revert_to_original_charge_balance_species(&mut self) -> bool {
        let Some(original) = self.db.basis_index_of(&self.original_charge_balance_species) else {
            return false;
        };
        if original == self.charge_balance_index {
            return false;
        }
        if self.set_charge_balance_species(original).is_err() {
            return false;
        }
        info!(
            to = %self.charge_balance_species,
            "reverted to original charge-balance species"
        );
        true
    }
}
