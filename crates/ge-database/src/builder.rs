//! Incremental database builder.

use std::collections::HashMap;

use nalgebra::DMatrix;

use crate::database::ModelDatabase;
use crate::error::{DatabaseError, DatabaseResult};
use crate::species::{SorbingSurface, Species};
use crate::validate;

#[derive(Debug, Clone)]
struct PendingReaction {
    species: Species,
    reactants: Vec<(String, f64)>,
    log10k: Vec<f64>,
}

#[derive(Debug, Clone)]
struct PendingRedox {
    name: String,
    reactants: Vec<(String, f64)>,
    log10k: Vec<f64>,
}

fn owned_reactants(reactants: &[(&str, f64)]) -> Vec<(String, f64)> {
    reactants
        .iter()
        .map(|(name, nu)| ((*name).to_string(), *nu))
        .collect()
}

/// Write one reaction into row `row` of `stoichiometry` and `log10k`.
fn resolve_reaction(
    name: &str,
    reactants: &[(String, f64)],
    values: &[f64],
    basis_index: &HashMap<String, usize>,
    row: usize,
    stoichiometry: &mut DMatrix<f64>,
    log10k: &mut DMatrix<f64>,
) -> DatabaseResult<()> {
    for (reactant, nu) in reactants {
        let i = *basis_index
            .get(reactant)
            .ok_or_else(|| DatabaseError::UnknownReactant {
                species: name.to_string(),
                name: reactant.clone(),
            })?;
        stoichiometry[(row, i)] += nu;
    }
    if values.len() != log10k.ncols() {
        return Err(DatabaseError::Log10KArity {
            species: name.to_string(),
            expected: log10k.ncols(),
            got: values.len(),
        });
    }
    for (t, value) in values.iter().enumerate() {
        log10k[(row, t)] = *value;
    }
    Ok(())
}

/// Builder for constructing a `ModelDatabase` incrementally.
///
/// Add basis species first (water at index 0), then equilibrium species
/// with their reactions written in terms of basis species names. `build()`
/// resolves the names into the stoichiometric matrix and validates the result.
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    temperatures: Vec<f64>,
    basis: Vec<Species>,
    equilibrium: Vec<PendingReaction>,
    surfaces: Vec<SorbingSurface>,
    kinetic_species: Vec<String>,
    redox: Vec<PendingRedox>,
}

impl DatabaseBuilder {
    /// Create a builder whose log10K tables are tabulated at `temperatures` [°C].
    pub fn new(temperatures: Vec<f64>) -> Self {
        Self {
            temperatures,
            ..Self::default()
        }
    }

    /// Add a basis species and return its index.
    pub fn add_basis(&mut self, species: Species) -> usize {
        self.basis.push(species);
        self.basis.len() - 1
    }

    /// Add an equilibrium species formed from `reactants` and return its index.
    pub fn add_equilibrium(
        &mut self,
        species: Species,
        reactants: &[(&str, f64)],
        log10k: &[f64],
    ) -> usize {
        self.equilibrium.push(PendingReaction {
            species,
            reactants: owned_reactants(reactants),
            log10k: log10k.to_vec(),
        });
        self.equilibrium.len() - 1
    }

    /// Add a redox couple held out of equilibrium and return its index.
    ///
    /// `reactants` express the couple's left-hand side (usually the free
    /// electron) in terms of basis species names.
    pub fn add_redox(
        &mut self,
        name: impl Into<String>,
        reactants: &[(&str, f64)],
        log10k: &[f64],
    ) -> usize {
        self.redox.push(PendingRedox {
            name: name.into(),
            reactants: owned_reactants(reactants),
            log10k: log10k.to_vec(),
        });
        self.redox.len() - 1
    }

    /// Add a sorbing surface provided by `mineral` and return its index.
    pub fn add_surface(&mut self, mineral: impl Into<String>, area: f64) -> usize {
        self.surfaces.push(SorbingSurface {
            mineral: mineral.into(),
            area,
        });
        self.surfaces.len() - 1
    }

    /// Record a kinetic species.
    pub fn add_kinetic(&mut self, name: impl Into<String>) {
        self.kinetic_species.push(name.into());
    }

    /// Build and validate the database.
    pub fn build(self) -> DatabaseResult<ModelDatabase> {
        let nb = self.basis.len();
        let ne = self.equilibrium.len();
        let nt = self.temperatures.len();

        let mut basis_index = HashMap::with_capacity(nb);
        for (i, species) in self.basis.iter().enumerate() {
            if basis_index.insert(species.name.clone(), i).is_some() {
                return Err(DatabaseError::DuplicateSpecies {
                    name: species.name.clone(),
                });
            }
        }

        let mut equilibrium_index = HashMap::with_capacity(ne);
        let mut stoichiometry = DMatrix::zeros(ne, nb);
        let mut log10k = DMatrix::zeros(ne, nt);
        let mut equilibrium = Vec::with_capacity(ne);

        for (j, pending) in self.equilibrium.into_iter().enumerate() {
            let name = &pending.species.name;
            if basis_index.contains_key(name)
                || equilibrium_index.insert(name.clone(), j).is_some()
            {
                return Err(DatabaseError::DuplicateSpecies { name: name.clone() });
            }
            resolve_reaction(
                name,
                &pending.reactants,
                &pending.log10k,
                &basis_index,
                j,
                &mut stoichiometry,
                &mut log10k,
            )?;
            equilibrium.push(pending.species);
        }

        let nr = self.redox.len();
        let mut redox_couples: Vec<String> = Vec::with_capacity(nr);
        let mut redox_stoichiometry = DMatrix::zeros(nr, nb);
        let mut redox_log10k = DMatrix::zeros(nr, nt);
        for (r, pending) in self.redox.into_iter().enumerate() {
            if redox_couples.contains(&pending.name) {
                return Err(DatabaseError::DuplicateSpecies { name: pending.name });
            }
            resolve_reaction(
                &pending.name,
                &pending.reactants,
                &pending.log10k,
                &basis_index,
                r,
                &mut redox_stoichiometry,
                &mut redox_log10k,
            )?;
            redox_couples.push(pending.name);
        }

        let db = ModelDatabase {
            basis: self.basis,
            equilibrium,
            basis_index,
            equilibrium_index,
            stoichiometry,
            log10k,
            temperatures: self.temperatures,
            surfaces: self.surfaces,
            kinetic_species: self.kinetic_species,
            redox_couples,
            redox_stoichiometry,
            redox_log10k,
        };
        validate::validate_database(&db)?;
        Ok(db)
    }
}
