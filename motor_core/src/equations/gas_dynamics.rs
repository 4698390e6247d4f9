//! # Isentropic Flow Relations
//!
//! Quasi-one-dimensional isentropic flow of a calorically perfect gas through
//! a converging-diverging nozzle. All functions are pure.
//!
//! ## Notation
//!
//! - `p0`, `T0` = Stagnation (chamber) pressure and temperature
//! - `γ` = Ratio of specific heats
//! - `R` = Specific gas constant
//! - `M` = Mach number
//! - `ε` = Area ratio A/A* (exit-to-throat for the nozzle exit)
//! - `pe` = Exit static pressure
//!
//! ## References
//!
//! - Sutton & Biblarz, Rocket Propulsion Elements, 9th Edition, Chapter 3
//! - Anderson, Modern Compressible Flow, 3rd Edition, Chapter 5

use serde::{Deserialize, Serialize};

use crate::config::SolverOptions;
use crate::equations::numeric::bisect;
use crate::errors::{CalcError, CalcResult};

/// Smallest Mach number the subsonic bracket reaches down to.
const SUBSONIC_MACH_FLOOR: f64 = 1e-9;

/// Chamber stagnation state. Fully determines the throat and exit
/// thermodynamic state for a given expansion.
///
/// ## JSON Example
///
/// ```json
/// { "p0_pa": 6106000.0, "t0_k": 1601.209, "gamma": 1.136397, "r_j_per_kg_k": 234.918 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChamberState {
    /// Stagnation pressure (Pa)
    pub p0_pa: f64,
    /// Stagnation temperature (K)
    pub t0_k: f64,
    /// Ratio of specific heats
    pub gamma: f64,
    /// Specific gas constant (J/kg·K)
    pub r_j_per_kg_k: f64,
}

impl ChamberState {
    /// Validate that the state is physical.
    pub fn validate(&self) -> CalcResult<()> {
        if !(self.p0_pa > 0.0) || !self.p0_pa.is_finite() {
            return Err(CalcError::invalid_chamber_state(
                "p0_pa",
                self.p0_pa.to_string(),
                "Chamber pressure must be positive",
            ));
        }
        if !(self.t0_k > 0.0) || !self.t0_k.is_finite() {
            return Err(CalcError::invalid_chamber_state(
                "t0_k",
                self.t0_k.to_string(),
                "Chamber temperature must be positive",
            ));
        }
        validate_gamma(self.gamma)?;
        if !(self.r_j_per_kg_k > 0.0) || !self.r_j_per_kg_k.is_finite() {
            return Err(CalcError::invalid_chamber_state(
                "r_j_per_kg_k",
                self.r_j_per_kg_k.to_string(),
                "Gas constant must be positive",
            ));
        }
        Ok(())
    }
}

fn validate_gamma(gamma: f64) -> CalcResult<()> {
    if !(gamma > 1.0) || !gamma.is_finite() {
        return Err(CalcError::invalid_chamber_state(
            "gamma",
            gamma.to_string(),
            "Ratio of specific heats must exceed 1",
        ));
    }
    Ok(())
}

/// Which solution of the area–Mach relation to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowBranch {
    /// M ∈ (0, 1), converging section
    Subsonic,
    /// M ∈ (1, Mmax], diverging section
    #[default]
    Supersonic,
}

/// Sonic conditions at the throat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroatConditions {
    /// Throat static temperature Tt = 2T0/(γ+1) (K)
    pub temperature_k: f64,
    /// Throat static pressure p* (Pa)
    pub pressure_pa: f64,
    /// Sonic velocity at the throat vt = √(γRTt) (m/s)
    pub velocity_m_s: f64,
}

/// Sonic throat conditions.
///
/// # Formulas
/// - Tt = 2·T0/(γ+1)
/// - p* = p0·(2/(γ+1))^(γ/(γ−1))
/// - vt = √(γ·R·Tt)
pub fn throat_conditions(chamber: &ChamberState) -> CalcResult<ThroatConditions> {
    chamber.validate()?;
    let g = chamber.gamma;
    let temperature_k = 2.0 * chamber.t0_k / (g + 1.0);
    let pressure_pa = chamber.p0_pa * (2.0 / (g + 1.0)).powf(g / (g - 1.0));
    let velocity_m_s = (g * chamber.r_j_per_kg_k * temperature_k).sqrt();
    Ok(ThroatConditions {
        temperature_k,
        pressure_pa,
        velocity_m_s,
    })
}

/// Ideal exhaust velocity for isentropic expansion from `p0` to `pe`.
///
/// # Formula
/// ```text
/// ve = √[ (2γ/(γ−1))·R·T0·(1 − (pe/p0)^((γ−1)/γ)) ]
/// ```
///
/// Requires 0 < pe ≤ p0.
pub fn exhaust_velocity(chamber: &ChamberState, pe_pa: f64) -> CalcResult<f64> {
    chamber.validate()?;
    if !(pe_pa > 0.0) || pe_pa > chamber.p0_pa {
        return Err(CalcError::non_physical_expansion(
            "pe_pa",
            pe_pa.to_string(),
            format!("Exit pressure must be in (0, p0 = {} Pa]", chamber.p0_pa),
        ));
    }
    let g = chamber.gamma;
    let expansion = 1.0 - (pe_pa / chamber.p0_pa).powf((g - 1.0) / g);
    Ok((2.0 * g / (g - 1.0) * chamber.r_j_per_kg_k * chamber.t0_k * expansion).sqrt())
}

/// Area ratio A/A* at Mach `m`.
///
/// # Formula
/// ```text
/// ε = (1/M)·[ (2/(γ+1))·(1 + (γ−1)/2·M²) ]^((γ+1)/(2(γ−1)))
/// ```
///
/// # Example
/// ```rust
/// use motor_core::equations::gas_dynamics::area_ratio_from_mach;
///
/// // Sonic throat
/// assert!((area_ratio_from_mach(1.0, 1.4) - 1.0).abs() < 1e-12);
/// // Tabulated value for air at M = 2
/// assert!((area_ratio_from_mach(2.0, 1.4) - 1.6875).abs() < 1e-4);
/// ```
#[inline]
pub fn area_ratio_from_mach(m: f64, gamma: f64) -> f64 {
    let exponent = (gamma + 1.0) / (2.0 * (gamma - 1.0));
    (1.0 / m) * (2.0 / (gamma + 1.0) * (1.0 + 0.5 * (gamma - 1.0) * m * m)).powf(exponent)
}

/// Stagnation-to-static pressure ratio p0/p at Mach `m`.
#[inline]
pub fn pressure_ratio_from_mach(m: f64, gamma: f64) -> f64 {
    (1.0 + 0.5 * (gamma - 1.0) * m * m).powf(gamma / (gamma - 1.0))
}

/// Stagnation-to-static temperature ratio T0/T at Mach `m`.
#[inline]
pub fn temperature_ratio_from_mach(m: f64, gamma: f64) -> f64 {
    1.0 + 0.5 * (gamma - 1.0) * m * m
}

/// Mach number for a given area ratio, on the requested branch.
///
/// There is no closed form, so the relation is inverted by bisection over
/// `(1, max_mach]` (supersonic) or `(0, 1)` (subsonic). The area ratio is
/// monotonic on each branch, which guarantees the bracket.
///
/// # Errors
/// - `InvalidChamberState` if γ ≤ 1
/// - `NonPhysicalExpansion` if ε < 1
/// - `SolverDidNotConverge` if the iteration cap is hit, or ε lies beyond the
///   bracket (retry with a larger `max_mach` or a looser tolerance)
pub fn mach_from_area_ratio(
    area_ratio: f64,
    gamma: f64,
    branch: FlowBranch,
    options: &SolverOptions,
) -> CalcResult<f64> {
    validate_gamma(gamma)?;
    if !(area_ratio >= 1.0) || !area_ratio.is_finite() {
        return Err(CalcError::non_physical_expansion(
            "area_ratio",
            area_ratio.to_string(),
            "Area ratio must be at least 1 (throat is the minimum section)",
        ));
    }
    if area_ratio == 1.0 {
        return Ok(1.0);
    }

    let (lo, hi) = match branch {
        FlowBranch::Supersonic => (1.0, options.max_mach),
        FlowBranch::Subsonic => (SUBSONIC_MACH_FLOOR, 1.0),
    };
    bisect("mach_from_area_ratio", |m| area_ratio_from_mach(m, gamma), area_ratio, lo, hi, options)
}

/// Mach number reached by isentropic expansion through stagnation-to-static
/// pressure ratio `p0/p`.
///
/// # Formula
/// ```text
/// M = √[ (2/(γ−1))·((p0/p)^((γ−1)/γ) − 1) ]
/// ```
pub fn mach_from_pressure_ratio(pressure_ratio: f64, gamma: f64) -> CalcResult<f64> {
    validate_gamma(gamma)?;
    if !(pressure_ratio >= 1.0) || !pressure_ratio.is_finite() {
        return Err(CalcError::non_physical_expansion(
            "pressure_ratio",
            pressure_ratio.to_string(),
            "Stagnation-to-static pressure ratio must be at least 1",
        ));
    }
    Ok((2.0 / (gamma - 1.0) * (pressure_ratio.powf((gamma - 1.0) / gamma) - 1.0)).sqrt())
}

/// Choked mass flux through the throat, mdot/At (kg/s·m²).
///
/// # Formula
/// ```text
/// mdot/At = p0·√(γ/(R·T0))·(2/(γ+1))^((γ+1)/(2(γ−1)))
/// ```
pub fn choked_mass_flux(chamber: &ChamberState) -> CalcResult<f64> {
    chamber.validate()?;
    let g = chamber.gamma;
    let exponent = (g + 1.0) / (2.0 * (g - 1.0));
    Ok(chamber.p0_pa * (g / (chamber.r_j_per_kg_k * chamber.t0_k)).sqrt() * (2.0 / (g + 1.0)).powf(exponent))
}

/// Characteristic velocity c* = p0·At/mdot (m/s). Depends only on the gas.
pub fn characteristic_velocity(chamber: &ChamberState) -> CalcResult<f64> {
    Ok(chamber.p0_pa / choked_mass_flux(chamber)?)
}

/// Ideal thrust coefficient Cf = F/(p0·At).
///
/// Momentum term plus pressure term (pe − pa)·ε/p0.
pub fn thrust_coefficient(gamma: f64, pe_over_p0: f64, pa_over_p0: f64, area_ratio: f64) -> f64 {
    let g = gamma;
    let momentum = (2.0 * g * g / (g - 1.0)
        * (2.0 / (g + 1.0)).powf((g + 1.0) / (g - 1.0))
        * (1.0 - pe_over_p0.powf((g - 1.0) / g)))
    .sqrt();
    momentum + (pe_over_p0 - pa_over_p0) * area_ratio
}
