//! Deciding whether the basis should change after a Newton solve.

use ge_system::EquilibriumSystem;

use crate::config::SolverConfig;
use crate::error::{SolverError, SolverResult};

/// Why a swap was proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapReason {
    /// Newton did not converge and a basis species is nearly exhausted
    LowMolality,
    /// A basis mineral has negative free moles
    DissolvedMineral,
    /// An equilibrium mineral is supersaturated
    Supersaturated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapProposal {
    pub out_of_basis: usize,
    pub into_basis: usize,
    pub reason: SwapReason,
}

/// Propose at most one swap, checking in priority order:
///
/// 1. not converged: the lowest-molality algebraic basis species (other than
///    the charge-balance species) below `swap_threshold`
/// 2. converged: the basis mineral with the most negative free moles
/// 3. converged: the equilibrium mineral with the largest positive saturation
///    index that is not in `prevent_precipitation`
///
/// A condition that fires without a legitimate partner is an error.
pub fn swap_needed(
    system: &EquilibriumSystem<'_>,
    config: &SolverConfig,
    converged: bool,
) -> SolverResult<Option<SwapProposal>> {
    let db = system.database();
    let molality = system.basis_molality();
    let cb = system.charge_balance_index();

    if !converged {
        let lowest = (1..system.num_basis())
            .filter(|&i| {
                system.layout().is_algebraic(i)
                    && i != cb
                    && !db.basis_species(i).is_mineral()
                    && molality[i] < config.swap_threshold
            })
            .min_by(|&a, &b| molality[a].total_cmp(&molality[b]));
        let Some(out) = lowest else {
            return Ok(None);
        };
        let into = best_replacement(system, out, true).ok_or_else(|| {
            SolverError::NoSwapCandidate {
                what: format!(
                    "no equilibrium species can replace {} in the basis",
                    db.basis_species(out).name
                ),
            }
        })?;
        return Ok(Some(SwapProposal {
            out_of_basis: out,
            into_basis: into,
            reason: SwapReason::LowMolality,
        }));
    }

    let dissolved = (1..system.num_basis())
        .filter(|&i| db.basis_species(i).is_mineral() && molality[i] < 0.0)
        .min_by(|&a, &b| molality[a].total_cmp(&molality[b]));
    if let Some(out) = dissolved {
        let into = best_replacement(system, out, false).ok_or_else(|| {
            SolverError::NoSwapCandidate {
                what: format!(
                    "the mineral {} has dissolved but no equilibrium species can replace it in the basis",
                    db.basis_species(out).name
                ),
            }
        })?;
        return Ok(Some(SwapProposal {
            out_of_basis: out,
            into_basis: into,
            reason: SwapReason::DissolvedMineral,
        }));
    }

    let si = system.saturation_indices();
    let supersaturated = (0..system.num_equilibrium())
        .filter(|&j| {
            let species = db.equilibrium_species(j);
            species.is_mineral()
                && si[j] > 0.0
                && !config.prevent_precipitation.contains(&species.name)
        })
        .max_by(|&a, &b| si[a].total_cmp(&si[b]));
    if let Some(into) = supersaturated {
        let out = best_evictee(system, into).ok_or_else(|| SolverError::NoSwapCandidate {
            what: format!(
                "the mineral {} is supersaturated but no basis species can be removed to make room for it",
                db.equilibrium_species(into).name
            ),
        })?;
        return Ok(Some(SwapProposal {
            out_of_basis: out,
            into_basis: into,
            reason: SwapReason::Supersaturated,
        }));
    }

    Ok(None)
}

/// Equilibrium species maximising `|ν_j,out| m_j`, skipping gases and
/// surface species (and minerals unless `allow_minerals`).
fn best_replacement(system: &EquilibriumSystem<'_>, out: usize, allow_minerals: bool) -> Option<usize> {
    let db = system.database();
    let eqm = system.eqm_molalities();
    (0..system.num_equilibrium())
        .filter(|&j| {
            let species = db.equilibrium_species(j);
            !species.is_gas() && !species.is_surface_related() && (allow_minerals || !species.is_mineral())
        })
        .map(|j| (j, db.stoich(j, out).abs() * eqm[j]))
        .filter(|&(_, metric)| metric > 0.0)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(j, _)| j)
}

/// Basis species maximising `|ν_into,i| / m_i`, skipping water, the
/// charge-balance species, gases and species with fixed activity.
fn best_evictee(system: &EquilibriumSystem<'_>, into: usize) -> Option<usize> {
    let db = system.database();
    let molality = system.basis_molality();
    let known = system.basis_activity_known();
    let cb = system.charge_balance_index();
    (1..system.num_basis())
        .filter(|&i| i != cb && !db.basis_species(i).is_gas() && !known[i] && molality[i] > 0.0)
        .map(|i| (i, db.stoich(into, i).abs() / molality[i]))
        .filter(|&(_, metric)| metric > 0.0)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}
