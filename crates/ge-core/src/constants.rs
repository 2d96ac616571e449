//! Physical constants used by the speciation equations (SI unless noted).

use crate::Real;

/// Moles of H2O in one kilogram of water.
pub const MOLES_PER_KG_WATER: Real = 55.5;

/// Offset between degrees Celsius and Kelvin.
pub const CELSIUS_TO_KELVIN: Real = 273.15;

/// Universal gas constant [J/(K·mol)].
pub const GAS_CONSTANT: Real = 8.314472;

/// Faraday constant [C/mol].
pub const FARADAY: Real = 96485.3415;

/// Permittivity of free space [F/m].
pub const PERMITTIVITY_FREE_SPACE: Real = 8.854187817e-12;

/// Relative dielectric constant of water at 25 °C.
pub const DIELECTRIC_CONSTANT_WATER: Real = 78.5;

/// Density of water [kg/m³].
pub const DENSITY_WATER: Real = 1000.0;

/// ln(10)
pub const LOGTEN: Real = std::f64::consts::LN_10;
