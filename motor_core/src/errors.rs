//! # Error Types
//!
//! Structured error types for motor_core. Every variant names the offending
//! input (or solver) and the bound that was violated, so a caller can correct
//! the request without reading the source.
//!
//! Advisory conditions (low factor of safety, extrapolated drag correlation,
//! unusual mass fraction) are *not* errors. They travel with a valid result
//! as [`Advisory`](crate::calculations::Advisory) values.
//!
//! ## Example
//!
//! ```rust
//! use motor_core::errors::{CalcError, CalcResult};
//!
//! fn validate_thrust(thrust_n: f64) -> CalcResult<()> {
//!     if thrust_n <= 0.0 {
//!         return Err(CalcError::invalid_nozzle_spec(
//!             "thrust_target_n",
//!             thrust_n.to_string(),
//!             "Thrust target must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert_eq!(
//!     validate_thrust(-1.0).unwrap_err().error_code(),
//!     "INVALID_NOZZLE_SPEC"
//! );
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for motor_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// Chamber stagnation state is not physical (γ ≤ 1, T0 ≤ 0, ...)
    #[error("Invalid chamber state for '{field}': {value} - {reason}")]
    InvalidChamberState {
        field: String,
        value: String,
        reason: String,
    },

    /// Requested expansion cannot happen isentropically (pe > p0, ε ≤ 1, ...)
    #[error("Non-physical expansion for '{field}': {value} - {reason}")]
    NonPhysicalExpansion {
        field: String,
        value: String,
        reason: String,
    },

    /// Nozzle design request is out of range
    #[error("Invalid nozzle spec for '{field}': {value} - {reason}")]
    InvalidNozzleSpec {
        field: String,
        value: String,
        reason: String,
    },

    /// Case or fastener geometry cannot exist (negative inner diameter, ...)
    #[error("Non-physical geometry for '{field}': {value} - {reason}")]
    NonPhysicalGeometry {
        field: String,
        value: String,
        reason: String,
    },

    /// A bounded iteration hit its cap before meeting its tolerance.
    ///
    /// The last estimate is deliberately not returned.
    #[error("Solver '{solver}' did not converge after {iterations} iterations (residual {residual:e}, tolerance {tolerance:e})")]
    SolverDidNotConverge {
        solver: String,
        iterations: u32,
        residual: f64,
        tolerance: f64,
    },

    /// Any other input value is out of range
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Engine configuration could not be read or is inconsistent
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },
}

impl CalcError {
    /// Create an InvalidChamberState error
    pub fn invalid_chamber_state(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidChamberState {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a NonPhysicalExpansion error
    pub fn non_physical_expansion(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::NonPhysicalExpansion {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidNozzleSpec error
    pub fn invalid_nozzle_spec(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidNozzleSpec {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a NonPhysicalGeometry error
    pub fn non_physical_geometry(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::NonPhysicalGeometry {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a SolverDidNotConverge error
    pub fn did_not_converge(solver: impl Into<String>, iterations: u32, residual: f64, tolerance: f64) -> Self {
        CalcError::SolverDidNotConverge {
            solver: solver.into(),
            iterations,
            residual,
            tolerance,
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a ConfigError
    pub fn config(reason: impl Into<String>) -> Self {
        CalcError::ConfigError {
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error.
    ///
    /// Only solver non-convergence qualifies: the caller can retry with
    /// relaxed solver options. Everything else needs a corrected request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::SolverDidNotConverge { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidChamberState { .. } => "INVALID_CHAMBER_STATE",
            CalcError::NonPhysicalExpansion { .. } => "NON_PHYSICAL_EXPANSION",
            CalcError::InvalidNozzleSpec { .. } => "INVALID_NOZZLE_SPEC",
            CalcError::NonPhysicalGeometry { .. } => "NON_PHYSICAL_GEOMETRY",
            CalcError::SolverDidNotConverge { .. } => "SOLVER_DID_NOT_CONVERGE",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::ConfigError { .. } => "CONFIG_ERROR",
        }
    }
}

impl From<toml::de::Error> for CalcError {
    fn from(err: toml::de::Error) -> Self {
        CalcError::config(err.to_string())
    }
}
