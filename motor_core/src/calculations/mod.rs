//! # Motor Calculations
//!
//! The three sizing calculators. Each follows the pattern:
//!
//! - `*Spec` - Input parameters (JSON-serializable)
//! - `*Result` / `*Geometry` - Calculation results (JSON-serializable)
//! - `op(spec) -> CalcResult<*>` - Pure calculation with the default
//!   configuration, plus an `op_with(spec, config)` variant
//!
//! Calculators are independent: a caller may run any subset, in any order,
//! from any number of threads.
//!
//! ## Available Calculations
//!
//! - [`nozzle`] - Throat/exit sizing and wall contour
//! - [`structure`] - Case stresses, bulkhead thickness, bolt count
//! - [`performance`] - Required impulse for a target apogee
//!
//! ## Request Dispatch
//!
//! [`CalculationRequest`] wraps any of the three inputs in one tagged JSON
//! document, so a transport layer only has to call [`evaluate`]:
//!
//! ```rust
//! use motor_core::calculations::{evaluate, CalculationOutput, CalculationRequest};
//!
//! let request: CalculationRequest = serde_json::from_str(r#"{
//!     "type": "solve_performance",
//!     "spec": {
//!         "target_apogee_m": 500.0,
//!         "burn_time_s": 1.0,
//!         "empty_mass_kg": 2.5,
//!         "propellant_mass_fraction": 0.14,
//!         "diameter_m": 0.05,
//!         "drag_coefficient": 0.45
//!     }
//! }"#).unwrap();
//!
//! match evaluate(&request).unwrap() {
//!     CalculationOutput::Performance(result) => assert!(result.total_impulse_ns > 0.0),
//!     _ => unreachable!(),
//! }
//! ```

pub mod nozzle;
pub mod performance;
pub mod structure;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{self, EngineConfig};
use crate::equations::ChamberState;
use crate::errors::CalcResult;

// Re-export commonly used types
pub use nozzle::{ContourPoint, ContourType, NozzleGeometry, NozzleSpec};
pub use performance::{DragFactors, MassFractionBasis, MotorClass, PerformanceResult, PerformanceSpec};
pub use structure::{PressureVesselSpec, StressResult, WallModel};

// ============================================================================
// Advisories
// ============================================================================

/// A cautionary condition attached to an otherwise valid result.
///
/// Advisories never abort a calculation; the numbers may still be useful
/// while iterating on a design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Advisory {
    /// A factor of safety fell below the configured minimum
    LowFactorOfSafety {
        /// Which check: `case`, `bolt_bearing`, `net_section`
        check: String,
        factor_of_safety: f64,
        minimum: f64,
    },

    /// Drag influence number beyond the calibrated correlation
    DragCorrelationExtrapolated { drag_influence_number: f64, calibrated_max: f64 },

    /// Propellant mass fraction outside the usual range
    UnusualMassFraction { mass_fraction: f64, min: f64, max: f64 },

    /// Peak acceleration beyond the sanity bound
    HighAcceleration { acceleration_g: f64, limit_g: f64 },

    /// Required Isp higher than amateur solid propellants deliver
    HighSpecificImpulse { specific_impulse_s: f64, limit_s: f64 },

    /// Exit pressure differs from ambient (expansion ratio override)
    OffDesignExpansion {
        exit_pressure_pa: f64,
        ambient_pressure_pa: f64,
        /// Over-expanded far enough that the flow may separate
        separation_risk: bool,
    },

    /// The requested contour does not fit and another was drawn instead
    ContourFallback {
        requested: ContourType,
        used: ContourType,
        expansion_ratio: f64,
    },
}

impl Advisory {
    /// Stable machine-readable code, matching the serialized tag
    pub fn code(&self) -> &'static str {
        match self {
            Advisory::LowFactorOfSafety { .. } => "low_factor_of_safety",
            Advisory::DragCorrelationExtrapolated { .. } => "drag_correlation_extrapolated",
            Advisory::UnusualMassFraction { .. } => "unusual_mass_fraction",
            Advisory::HighAcceleration { .. } => "high_acceleration",
            Advisory::HighSpecificImpulse { .. } => "high_specific_impulse",
            Advisory::OffDesignExpansion { .. } => "off_design_expansion",
            Advisory::ContourFallback { .. } => "contour_fallback",
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::LowFactorOfSafety {
                check,
                factor_of_safety,
                minimum,
            } => write!(f, "{} factor of safety {:.2} is below {:.2}", check, factor_of_safety, minimum),
            Advisory::DragCorrelationExtrapolated {
                drag_influence_number,
                calibrated_max,
            } => write!(
                f,
                "drag influence number {:.0} exceeds the calibrated range (N <= {:.0}); factors extrapolated",
                drag_influence_number, calibrated_max
            ),
            Advisory::UnusualMassFraction { mass_fraction, min, max } => write!(
                f,
                "propellant mass fraction {:.1}% is outside {:.0}-{:.0}%",
                mass_fraction * 100.0,
                min * 100.0,
                max * 100.0
            ),
            Advisory::HighAcceleration { acceleration_g, limit_g } => write!(
                f,
                "peak acceleration {:.1} g exceeds {:.0} g; consider a longer burn",
                acceleration_g, limit_g
            ),
            Advisory::HighSpecificImpulse { specific_impulse_s, limit_s } => write!(
                f,
                "required specific impulse {:.0} s exceeds {:.0} s; add propellant",
                specific_impulse_s, limit_s
            ),
            Advisory::OffDesignExpansion {
                exit_pressure_pa,
                ambient_pressure_pa,
                separation_risk,
            } => {
                let state = if exit_pressure_pa > ambient_pressure_pa {
                    "under-expanded"
                } else {
                    "over-expanded"
                };
                write!(
                    f,
                    "nozzle is {} (pe = {:.0} Pa, pa = {:.0} Pa)",
                    state, exit_pressure_pa, ambient_pressure_pa
                )?;
                if *separation_risk {
                    write!(f, "; flow separation likely")?;
                }
                Ok(())
            }
            Advisory::ContourFallback {
                requested,
                used,
                expansion_ratio,
            } => write!(
                f,
                "no {:?} contour fits at area ratio {:.3}; drew a {:?} wall instead",
                requested, expansion_ratio, used
            ),
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// One calculation request, tagged by operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalculationRequest {
    /// Size a nozzle for a thrust target
    DesignNozzle { chamber: ChamberState, spec: NozzleSpec },
    /// Verify a motor case, bulkhead and bolts
    AnalyzeStructure { spec: PressureVesselSpec },
    /// Back-solve impulse for a target apogee
    SolvePerformance { spec: PerformanceSpec },
}

impl CalculationRequest {
    /// Operation name, as serialized
    pub fn operation(&self) -> &'static str {
        match self {
            CalculationRequest::DesignNozzle { .. } => "design_nozzle",
            CalculationRequest::AnalyzeStructure { .. } => "analyze_structure",
            CalculationRequest::SolvePerformance { .. } => "solve_performance",
        }
    }
}

/// Result of a [`CalculationRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalculationOutput {
    Nozzle(NozzleGeometry),
    Structure(StressResult),
    Performance(PerformanceResult),
}

impl CalculationOutput {
    /// Advisories attached to the result
    pub fn warnings(&self) -> &[Advisory] {
        match self {
            CalculationOutput::Nozzle(r) => &r.warnings,
            CalculationOutput::Structure(r) => &r.warnings,
            CalculationOutput::Performance(r) => &r.warnings,
        }
    }
}

/// Evaluate a request with the default configuration.
pub fn evaluate(request: &CalculationRequest) -> CalcResult<CalculationOutput> {
    evaluate_with(request, config::defaults())
}

/// Evaluate a request with an explicit configuration.
pub fn evaluate_with(request: &CalculationRequest, config: &EngineConfig) -> CalcResult<CalculationOutput> {
    tracing::debug!(operation = request.operation(), "evaluating request");
    let output = match request {
        CalculationRequest::DesignNozzle { chamber, spec } => {
            CalculationOutput::Nozzle(nozzle::design_with(chamber, spec, config)?)
        }
        CalculationRequest::AnalyzeStructure { spec } => {
            CalculationOutput::Structure(structure::analyze_with(spec, config)?)
        }
        CalculationRequest::SolvePerformance { spec } => {
            CalculationOutput::Performance(performance::solve_with(spec, config)?)
        }
    };
    Ok(output)
}
