//! # motor_core - Rocket Motor Sizing Engine
//!
//! `motor_core` turns high-level motor requirements (thrust, chamber
//! conditions, case geometry, target apogee) into engineering numbers: nozzle
//! contour geometry, case stresses and safety factors, and the total impulse
//! needed to reach an altitude. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **SI Inside**: Pa, K, m, kg; presentation units convert at the boundary
//! - **Bounded Solvers**: Every iteration has a cap and reports failure as an error
//! - **Rich Errors**: Structured error types, not just strings
//! - **Advisories, not Aborts**: Cautionary conditions travel with the result
//!
//! ## Quick Start
//!
//! ```rust
//! use motor_core::{design_nozzle, ChamberState, ContourType, NozzleSpec};
//!
//! let chamber = ChamberState {
//!     p0_pa: 6_106_000.0,
//!     t0_k: 1601.209,
//!     gamma: 1.136397,
//!     r_j_per_kg_k: 234.918,
//! };
//! let spec = NozzleSpec {
//!     thrust_target_n: 544.81,
//!     ambient_pressure_pa: 101_320.0,
//!     contour_type: ContourType::Conical,
//!     expansion_ratio: None,
//! };
//!
//! let nozzle = design_nozzle(&chamber, &spec).unwrap();
//! println!("Throat radius: {:.2} mm", nozzle.throat_radius_m * 1000.0);
//!
//! let json = serde_json::to_string_pretty(&nozzle).unwrap();
//! assert!(json.contains("contour_points"));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Nozzle, structure and performance calculators
//! - [`equations`] - Gas dynamics, pressure vessel formulas, root-finding
//! - [`config`] - Constant tables and solver options
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod config;
pub mod equations;
pub mod errors;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::nozzle::design as design_nozzle;
pub use calculations::performance::solve as solve_performance;
pub use calculations::structure::analyze as analyze_structure;
pub use calculations::{
    evaluate, evaluate_with, Advisory, CalculationOutput, CalculationRequest, ContourType, NozzleGeometry,
    NozzleSpec, PerformanceResult, PerformanceSpec, PressureVesselSpec, StressResult,
};
pub use config::EngineConfig;
pub use equations::{ChamberState, FlowBranch};
pub use errors::{CalcError, CalcResult};
