//! Equilibrium geochemical system: the chemical state at one sample point.

use ge_activity::{ActivityModel, IonicStrength};
use ge_core::constants::MOLES_PER_KG_WATER;
use ge_core::units::{Temperature, celsius, to_celsius};
use ge_core::{Tolerances, nearly_equal};
use ge_database::{BasisSwapper, ModelDatabase};
use nalgebra::DVector;
use tracing::debug;

use crate::algebraic::AlgebraicLayout;
use crate::constraint::Constraint;
use crate::error::{SystemError, SystemResult};
use crate::setup::SystemSetup;

/// Chemical state of an equilibrium system.
///
/// Holds exclusive borrows of the database and the collaborators for its whole
/// lifetime. All derived quantities (activities, equilibrium molalities, bulk
/// moles, free mineral moles, sorbing areas) are kept consistent with the
/// algebraic unknowns: every mutator finishes by recomputing them.
pub struct EquilibriumSystem<'a> {
    pub(crate) db: &'a mut ModelDatabase,
    pub(crate) activity: &'a mut dyn ActivityModel,
    pub(crate) ionic: &'a mut dyn IonicStrength,
    pub(crate) swapper: &'a dyn BasisSwapper,
    /// Temperature [°C]
    pub(crate) temperature: f64,
    pub(crate) iters_to_make_consistent: usize,
    pub(crate) min_initial_molality: f64,
    pub(crate) charge_balance_species: String,
    pub(crate) original_charge_balance_species: String,
    pub(crate) charge_balance_index: usize,
    /// One per basis slot, in basis order
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) original_values: Vec<f64>,
    pub(crate) layout: AlgebraicLayout,
    pub(crate) eqm_log10k: Vec<f64>,
    pub(crate) redox_log10k: Vec<f64>,
    /// Solvent mass for water, free moles for minerals, free molality otherwise
    pub(crate) basis_molality: Vec<f64>,
    pub(crate) basis_activity: Vec<f64>,
    pub(crate) basis_activity_known: Vec<bool>,
    pub(crate) basis_activity_coef: Vec<f64>,
    pub(crate) bulk_moles: Vec<f64>,
    pub(crate) eqm_molality: Vec<f64>,
    pub(crate) eqm_activity_coef: Vec<f64>,
    pub(crate) surface_pot_expr: Vec<f64>,
    pub(crate) sorbing_surface_area: Vec<f64>,
}

impl<'a> EquilibriumSystem<'a> {
    /// Build and initialize a system.
    ///
    /// Performs the requested swaps on `db`, validates the constraints, orders
    /// them like the basis and computes an initial consistent configuration.
    pub fn new(
        db: &'a mut ModelDatabase,
        activity: &'a mut dyn ActivityModel,
        ionic: &'a mut dyn IonicStrength,
        swapper: &'a dyn BasisSwapper,
        setup: SystemSetup,
    ) -> SystemResult<Self> {
        let cb = setup.charge_balance_species.clone();

        if !db.kinetic_species().is_empty() {
            return Err(SystemError::setup(
                "Equilibrium geochemical systems cannot use models that include kinetic species",
            ));
        }
        if setup.swap_out_of_basis.len() != setup.swap_into_basis.len() {
            return Err(SystemError::setup(
                "swap_out_of_basis must have same length as swap_into_basis",
            ));
        }
        if setup.swap_out_of_basis.iter().any(|name| *name == cb) {
            return Err(SystemError::setup(format!(
                "Cannot swap out {cb} because it is the charge-balance species"
            )));
        }
        for (out, into) in setup.swap_out_of_basis.iter().zip(&setup.swap_into_basis) {
            swapper
                .swap_by_name(db, out, into)
                .map_err(|e| SystemError::setup(e.to_string()))?;
        }

        let charge_balance_index = db.basis_index_of(&cb).ok_or_else(|| {
            SystemError::setup(format!(
                "Cannot enforce charge balance using {cb} because it is not in the basis"
            ))
        })?;
        if db.basis_species(charge_balance_index).charge == 0.0 {
            return Err(SystemError::setup(format!(
                "Cannot enforce charge balance using {cb} because it has zero charge"
            )));
        }

        let nb = db.num_basis();
        if setup.constrained_species.len() != setup.constraints.len() {
            return Err(SystemError::setup(
                "Constrained species names must have same length as constraint values",
            ));
        }
        if setup.constrained_species.len() != nb {
            return Err(SystemError::setup(
                "Constrained species names must have same length as the number of species in the basis (each component must be provided with a single constraint)",
            ));
        }
        for species in db.basis() {
            if !setup.constrained_species.contains(&species.name) {
                return Err(SystemError::setup(format!(
                    "The basis species {} must appear in the constrained species list",
                    species.name
                )));
            }
        }

        let mut ordered: Vec<Option<Constraint>> = vec![None; nb];
        for (name, constraint) in setup.constrained_species.iter().zip(&setup.constraints) {
            let i = db.basis_index_of(name).ok_or_else(|| {
                SystemError::setup(format!("{name} is not a basis species"))
            })?;
            ordered[i] = Some(*constraint);
        }
        let constraints = ordered
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                c.ok_or_else(|| {
                    SystemError::setup(format!(
                        "The basis species {} must appear in the constrained species list",
                        db.basis_species(i).name
                    ))
                })
            })
            .collect::<SystemResult<Vec<_>>>()?;

        for (species, constraint) in db.basis().iter().zip(&constraints) {
            constraint.check_value(&species.name)?;
            constraint.check_kind(species)?;
            if species.name == cb && !matches!(constraint, Constraint::BulkMolesSpecies(_)) {
                return Err(SystemError::setup(format!(
                    "For code consistency, the species {cb} must be provided with a bulk number of moles because it is the charge-balance species"
                )));
            }
        }

        if setup.min_initial_molality.is_nan() || setup.min_initial_molality <= 0.0 {
            return Err(SystemError::setup(format!(
                "min_initial_molality must be positive: you entered {}",
                setup.min_initial_molality
            )));
        }
        let temperature = to_celsius(setup.temperature);
        if !temperature.is_finite() {
            return Err(SystemError::setup("temperature must be finite"));
        }

        let ne = db.num_equilibrium();
        let ns = db.num_surfaces();
        let original_values = constraints.iter().map(Constraint::value).collect();
        let sorbing_surface_area = db.surfaces().iter().map(|s| s.area).collect();

        let mut system = Self {
            db,
            activity,
            ionic,
            swapper,
            temperature,
            iters_to_make_consistent: setup.iters_to_make_consistent,
            min_initial_molality: setup.min_initial_molality,
            charge_balance_species: cb.clone(),
            original_charge_balance_species: cb,
            charge_balance_index,
            constraints,
            original_values,
            layout: AlgebraicLayout::default(),
            eqm_log10k: vec![0.0; ne],
            redox_log10k: Vec::new(),
            basis_molality: vec![0.0; nb],
            basis_activity: vec![0.0; nb],
            basis_activity_known: vec![false; nb],
            basis_activity_coef: vec![1.0; nb],
            bulk_moles: vec![0.0; nb],
            eqm_molality: vec![0.0; ne],
            eqm_activity_coef: vec![1.0; ne],
            surface_pot_expr: vec![1.0; ns],
            sorbing_surface_area,
        };
        system.initialize();
        debug!(
            num_basis = nb,
            num_equilibrium = ne,
            num_algebraic = system.layout.len(),
            charge_balance = %system.charge_balance_species,
            "equilibrium system initialized"
        );
        Ok(system)
    }

    fn initialize(&mut self) {
        self.build_temperature_dependent_quantities();
        self.enforce_charge_balance_if_simple();
        self.layout = AlgebraicLayout::build(&*self.db, &self.constraints);
        self.init_bulk_and_free();
        self.build_known_basis_activities();
        self.eqm_molality.fill(0.0);
        self.surface_pot_expr.fill(1.0);
        self.compute_consistent_configuration();
    }

    pub(crate) fn build_temperature_dependent_quantities(&mut self) {
        self.eqm_log10k = self.db.log10k_at(self.temperature);
        self.redox_log10k = self.db.redox_log10k_at(self.temperature);
    }

    pub(crate) fn set_constraint_value(&mut self, i: usize, value: f64) {
        self.constraints[i] = self.constraints[i].with_value(value);
    }

    fn init_bulk_and_free(&mut self) {
        // water is slot 0, so the solvent mass is known before it is used
        for i in 0..self.num_basis() {
            let (bulk, molality) = match self.constraints[i] {
                Constraint::BulkMolesWater(v) => (
                    v,
                    (0.999 * v / MOLES_PER_KG_WATER).max(self.min_initial_molality),
                ),
                Constraint::KgSolventWater(v) => (v * MOLES_PER_KG_WATER / 0.999, v),
                Constraint::BulkMolesSpecies(v) => (
                    v,
                    (0.9 * v / self.basis_molality[0]).max(self.min_initial_molality),
                ),
                Constraint::FreeMolality(v) => (v * self.basis_molality[0] / 0.9, v),
                Constraint::FreeMolesMineral(v) => (v / 0.9, v),
                Constraint::Fugacity(v) => (0.0, v),
                Constraint::Activity(v) => (v / 0.9, if i == 0 { 1.0 } else { v / 0.9 }),
            };
            self.bulk_moles[i] = bulk;
            self.basis_molality[i] = molality;
        }
    }

    pub(crate) fn build_known_basis_activities(&mut self) {
        for i in 0..self.num_basis() {
            let known = if self.db.basis_species(i).is_mineral() {
                Some(1.0)
            } else if self.constraints[i].fixes_activity() {
                Some(self.constraints[i].value())
            } else {
                None
            };
            self.basis_activity_known[i] = known.is_some();
            if let Some(a) = known {
                self.basis_activity[i] = a;
            }
        }
    }

    /// Recompute every derived quantity from the current unknowns.
    pub fn compute_consistent_configuration(&mut self) {
        for _ in 0..=self.iters_to_make_consistent {
            self.activity.set_internal_parameters(
                self.temperature,
                &*self.db,
                &self.basis_molality,
                &self.eqm_molality,
                &*self.ionic,
            );
            self.activity.build_activity_coefficients(
                &*self.db,
                &mut self.basis_activity_coef,
                &mut self.eqm_activity_coef,
            );
            self.update_basis_molality_for_known_activity();
            self.compute_remaining_basis_activities();
            self.compute_eqm_molalities();
        }
        self.compute_bulk();
        self.compute_free_mineral_moles();
        self.compute_sorbing_surface_area();
    }

    fn update_basis_molality_for_known_activity(&mut self) {
        for i in 1..self.num_basis() {
            let species = self.db.basis_species(i);
            if self.basis_activity_known[i] && !species.is_mineral() && !species.is_gas() {
                self.basis_molality[i] = self.basis_activity[i] / self.basis_activity_coef[i];
            }
        }
    }

    fn compute_remaining_basis_activities(&mut self) {
        if !self.basis_activity_known[0] {
            self.basis_activity[0] = self.activity.water_activity();
        }
        for i in 1..self.num_basis() {
            if !self.basis_activity_known[i] {
                self.basis_activity[i] = self.basis_activity_coef[i] * self.basis_molality[i];
            }
        }
    }

    /// log10 of the activity product of equilibrium species `j`'s reaction.
    pub fn log10_activity_product(&self, j: usize) -> f64 {
        let mut log10ap = 0.0;
        for (i, a) in self.basis_activity.iter().enumerate() {
            let nu = self.db.stoich(j, i);
            if nu != 0.0 {
                log10ap += nu * a.log10();
            }
        }
        log10ap
    }

    fn surface_sorption_modifier(&self, j: usize) -> f64 {
        let species = self.db.equilibrium_species(j);
        match species.surface {
            Some(s) => self.surface_pot_expr[s].powf(2.0 * species.charge),
            None => 1.0,
        }
    }

    fn compute_eqm_molalities(&mut self) {
        for j in 0..self.num_equilibrium() {
            let species = self.db.equilibrium_species(j);
            self.eqm_molality[j] = if species.is_mineral() || species.is_gas() {
                0.0
            } else {
                // log10 form keeps 10^(large) from overflowing before the division
                let log10m = self.log10_activity_product(j) - self.eqm_log10k[j];
                10f64.powf(log10m) / self.eqm_activity_coef[j] * self.surface_sorption_modifier(j)
            };
        }
    }

    /// `Σ_j ν_ji m_j`
    pub(crate) fn eqm_sum(&self, i: usize) -> f64 {
        self.eqm_molality
            .iter()
            .enumerate()
            .map(|(j, m)| self.db.stoich(j, i) * m)
            .sum()
    }

    fn compute_bulk(&mut self) {
        let nw = self.basis_molality[0];
        for i in 0..self.num_basis() {
            let sum = self.eqm_sum(i);
            self.bulk_moles[i] = match self.constraints[i] {
                Constraint::BulkMolesWater(v) | Constraint::BulkMolesSpecies(v) => v,
                Constraint::KgSolventWater(_) => nw * (MOLES_PER_KG_WATER + sum),
                Constraint::FreeMolality(_) | Constraint::Activity(_) => {
                    nw * (self.basis_molality[i] + sum)
                }
                Constraint::FreeMolesMineral(v) => v + nw * sum,
                Constraint::Fugacity(_) => nw * sum,
            };
        }
    }

    fn compute_free_mineral_moles(&mut self) {
        let nw = self.basis_molality[0];
        for i in 0..self.num_basis() {
            if self.db.basis_species(i).is_mineral() {
                self.basis_molality[i] = self.bulk_moles[i] - nw * self.eqm_sum(i);
            }
        }
    }

    fn compute_sorbing_surface_area(&mut self) {
        for (s, surface) in self.db.surfaces().iter().enumerate() {
            let mut area = surface.area;
            if let Some(i) = self.db.basis_index_of(&surface.mineral) {
                let grams = self.db.basis_species(i).molecular_weight * self.basis_molality[i];
                area *= grams;
            }
            self.sorbing_surface_area[s] = area;
        }
    }

    /// Set the Newton unknowns and recompute the consistent configuration.
    ///
    /// Values are basis molalities (solvent mass for water) followed by
    /// surface-potential expressions, in algebraic order.
    pub fn set_algebraic_variables(&mut self, values: &[f64]) -> SystemResult<()> {
        if values.len() != self.layout.len() {
            return Err(SystemError::InvalidState {
                what: format!(
                    "Incorrect size in set_algebraic_variables: expected {}, got {}",
                    self.layout.len(),
                    values.len()
                ),
            });
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(SystemError::InvalidState {
                what: format!("Cannot set algebraic variables to non-positive values such as {bad}"),
            });
        }
        let nba = self.layout.num_basis_in_algebraic();
        for (a, &v) in values[..nba].iter().enumerate() {
            self.basis_molality[self.layout.basis_of(a)] = v;
        }
        self.surface_pot_expr.copy_from_slice(&values[nba..]);
        self.compute_consistent_configuration();
        Ok(())
    }

    /// Current Newton unknowns, in algebraic order.
    pub fn algebraic_values(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.layout.len(),
            self.layout
                .basis_indices()
                .iter()
                .map(|&i| self.basis_molality[i])
                .chain(self.surface_pot_expr.iter().copied()),
        )
    }

    /// Set ionic-strength caps, recomputing the configuration if either changed.
    ///
    /// Returns true if a cap changed.
    pub fn set_max_ionic_strengths(&mut self, max_is: f64, max_stoichiometric_is: f64) -> bool {
        let changed = self.ionic.max_ionic_strength() != max_is
            || self.ionic.max_stoichiometric_ionic_strength() != max_stoichiometric_is;
        if changed {
            self.ionic.set_max_ionic_strength(max_is);
            self.ionic
                .set_max_stoichiometric_ionic_strength(max_stoichiometric_is);
            self.compute_consistent_configuration();
        }
        changed
    }

    pub fn max_ionic_strength(&self) -> f64 {
        self.ionic.max_ionic_strength()
    }

    pub fn max_stoichiometric_ionic_strength(&self) -> f64 {
        self.ionic.max_stoichiometric_ionic_strength()
    }

    /// True if every constraint is honoured by the current state.
    pub fn are_all_required_constraints_valid(&self) -> bool {
        let tol = Tolerances {
            abs: 1e-15,
            rel: 1e-12,
        };
        self.constraints.iter().enumerate().all(|(i, c)| match *c {
            Constraint::BulkMolesWater(v) | Constraint::BulkMolesSpecies(v) => {
                nearly_equal(self.bulk_moles[i], v, tol)
            }
            Constraint::KgSolventWater(v) => nearly_equal(self.basis_molality[0], v, tol),
            Constraint::FreeMolality(v) | Constraint::FreeMolesMineral(v) => {
                nearly_equal(self.basis_molality[i], v, tol)
            }
            Constraint::Fugacity(v) | Constraint::Activity(v) => {
                nearly_equal(self.basis_activity[i], v, tol)
            }
        })
    }

    fn check_basis(&self, i: usize) -> SystemResult<()> {
        if i < self.num_basis() {
            Ok(())
        } else {
            Err(SystemError::IndexOutOfRange {
                what: "basis species",
                index: i,
                len: self.num_basis(),
            })
        }
    }

    fn check_eqm(&self, j: usize) -> SystemResult<()> {
        if j < self.num_equilibrium() {
            Ok(())
        } else {
            Err(SystemError::IndexOutOfRange {
                what: "equilibrium species",
                index: j,
                len: self.num_equilibrium(),
            })
        }
    }

    fn check_redox(&self, r: usize, what: &'static str) -> SystemResult<()> {
        if r < self.num_redox() {
            Ok(())
        } else {
            Err(SystemError::IndexOutOfRange {
                what,
                index: r,
                len: self.num_redox(),
            })
        }
    }

    pub fn database(&self) -> &ModelDatabase {
        &*self.db
    }

    pub fn temperature(&self) -> Temperature {
        celsius(self.temperature)
    }

    pub fn num_basis(&self) -> usize {
        self.db.num_basis()
    }

    pub fn num_equilibrium(&self) -> usize {
        self.db.num_equilibrium()
    }

    pub fn num_surfaces(&self) -> usize {
        self.layout.num_surfaces()
    }

    pub fn num_in_algebraic_system(&self) -> usize {
        self.layout.len()
    }

    pub fn num_basis_in_algebraic_system(&self) -> usize {
        self.layout.num_basis_in_algebraic()
    }

    pub fn layout(&self) -> &AlgebraicLayout {
        &self.layout
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn original_constraint_values(&self) -> &[f64] {
        &self.original_values
    }

    pub fn charge_balance_index(&self) -> usize {
        self.charge_balance_index
    }

    pub fn charge_balance_species(&self) -> &str {
        &self.charge_balance_species
    }

    pub fn solvent_water_mass(&self) -> f64 {
        self.basis_molality[0]
    }

    /// Solvent mass (slot 0), free moles (minerals) or free molality (others).
    pub fn basis_molality(&self) -> &[f64] {
        &self.basis_molality
    }

    pub fn bulk_moles(&self) -> &[f64] {
        &self.bulk_moles
    }

    pub fn basis_activities(&self) -> &[f64] {
        &self.basis_activity
    }

    pub fn basis_activity(&self, i: usize) -> SystemResult<f64> {
        self.check_basis(i)?;
        Ok(self.basis_activity[i])
    }

    pub fn basis_activity_known(&self) -> &[bool] {
        &self.basis_activity_known
    }

    pub fn basis_activity_coefficients(&self) -> &[f64] {
        &self.basis_activity_coef
    }

    pub fn basis_activity_coefficient(&self, i: usize) -> SystemResult<f64> {
        self.check_basis(i)?;
        Ok(self.basis_activity_coef[i])
    }

    pub fn eqm_molalities(&self) -> &[f64] {
        &self.eqm_molality
    }

    pub fn eqm_molality(&self, j: usize) -> SystemResult<f64> {
        self.check_eqm(j)?;
        Ok(self.eqm_molality[j])
    }

    pub fn eqm_activity_coefficients(&self) -> &[f64] {
        &self.eqm_activity_coef
    }

    pub fn eqm_activity_coefficient(&self, j: usize) -> SystemResult<f64> {
        self.check_eqm(j)?;
        Ok(self.eqm_activity_coef[j])
    }

    pub fn log10k(&self, j: usize) -> SystemResult<f64> {
        self.check_eqm(j)?;
        Ok(self.eqm_log10k[j])
    }

    pub fn num_redox(&self) -> usize {
        self.db.num_redox()
    }

    pub fn redox_log10k(&self, r: usize) -> SystemResult<f64> {
        self.check_redox(r, "log10K for redox species")?;
        Ok(self.redox_log10k[r])
    }

    /// log10 of the activity product of redox couple `r`, from the current
    /// basis activities.
    pub fn log10_redox_activity_product(&self, r: usize) -> SystemResult<f64> {
        self.check_redox(r, "activity product for redox species")?;
        let mut log10ap = 0.0;
        for (i, a) in self.basis_activity.iter().enumerate() {
            let nu = self.db.redox_stoich(r, i);
            if nu != 0.0 {
                log10ap += nu * a.log10();
            }
        }
        Ok(log10ap)
    }

    /// `log10 AP - log10K` for equilibrium minerals, 0 for everything else.
    pub fn saturation_indices(&self) -> Vec<f64> {
        (0..self.num_equilibrium())
            .map(|j| {
                if self.db.equilibrium_species(j).is_mineral() {
                    self.log10_activity_product(j) - self.eqm_log10k[j]
                } else {
                    0.0
                }
            })
            .collect()
    }

    pub fn total_charge(&self) -> f64 {
        self.db
            .basis()
            .iter()
            .zip(&self.bulk_moles)
            .map(|(species, bulk)| species.charge * bulk)
            .sum()
    }

    pub fn ionic_strength(&self) -> f64 {
        self.ionic
            .ionic_strength(&*self.db, &self.basis_molality, &self.eqm_molality)
    }

    pub fn stoichiometric_ionic_strength(&self) -> f64 {
        self.ionic
            .stoichiometric_ionic_strength(&*self.db, &self.basis_molality, &self.eqm_molality)
    }
}
