//! Layout of the algebraic (Newton) unknowns.

use ge_database::ModelDatabase;

use crate::constraint::Constraint;

/// Which basis slots are Newton unknowns, and how they map to algebraic slots.
///
/// Algebraic slots `0..num_basis_in_algebraic` are basis molalities (or the
/// solvent mass for water) in basis order; the remaining
/// `num_surfaces` slots are surface-potential expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlgebraicLayout {
    in_algebraic: Vec<bool>,
    /// basis slot -> algebraic slot
    algebraic_index: Vec<Option<usize>>,
    /// algebraic slot -> basis slot
    basis_index: Vec<usize>,
    num_surfaces: usize,
}

impl AlgebraicLayout {
    pub(crate) fn build(db: &ModelDatabase, constraints: &[Constraint]) -> Self {
        let in_algebraic: Vec<bool> = db
            .basis()
            .iter()
            .zip(constraints)
            .map(|(species, constraint)| {
                if species.is_water() {
                    matches!(constraint, Constraint::BulkMolesWater(_))
                } else if species.is_gas() || species.is_mineral() {
                    false
                } else {
                    matches!(constraint, Constraint::BulkMolesSpecies(_))
                }
            })
            .collect();

        let mut algebraic_index = vec![None; in_algebraic.len()];
        let mut basis_index = Vec::new();
        for (i, &flag) in in_algebraic.iter().enumerate() {
            if flag {
                algebraic_index[i] = Some(basis_index.len());
                basis_index.push(i);
            }
        }

        Self {
            in_algebraic,
            algebraic_index,
            basis_index,
            num_surfaces: db.num_surfaces(),
        }
    }

    pub fn num_basis_in_algebraic(&self) -> usize {
        self.basis_index.len()
    }

    pub fn num_surfaces(&self) -> usize {
        self.num_surfaces
    }

    /// Total number of unknowns.
    pub fn len(&self) -> usize {
        self.basis_index.len() + self.num_surfaces
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn in_algebraic(&self) -> &[bool] {
        &self.in_algebraic
    }

    pub fn is_algebraic(&self, basis: usize) -> bool {
        self.in_algebraic[basis]
    }

    pub fn algebraic_index_of(&self, basis: usize) -> Option<usize> {
        self.algebraic_index[basis]
    }

    /// Basis slot of algebraic slot `a` (which must be a basis unknown).
    pub fn basis_of(&self, a: usize) -> usize {
        self.basis_index[a]
    }

    pub fn basis_indices(&self) -> &[usize] {
        &self.basis_index
    }
}
