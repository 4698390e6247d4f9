//! # Engine Configuration
//!
//! Every constant table the calculators read lives here: nozzle contour
//! angles, structural policy factors, the drag-correlation table, motor class
//! boundaries, warning thresholds and root-finding options.
//!
//! The defaults are built once into an immutable process-wide value
//! ([`defaults`]). Calculations only ever borrow a config, so concurrent
//! requests share it without locking.
//!
//! ## Overrides
//!
//! A TOML file may override any subset of values. Missing sections and keys
//! fall back to the defaults.
//!
//! ```rust
//! use motor_core::config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     [structure]
//!     min_case_factor_of_safety = 1.5
//!
//!     [performance]
//!     max_iterations = 80
//! "#).unwrap();
//!
//! assert_eq!(config.structure.min_case_factor_of_safety, 1.5);
//! assert_eq!(config.performance.max_iterations, 80);
//! assert_eq!(config.nozzle.cone_half_angle_deg, 15.0);
//! ```

use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

static DEFAULT_CONFIG: Lazy<EngineConfig> = Lazy::new(EngineConfig::default);

/// Shared default configuration, built on first use.
pub fn defaults() -> &'static EngineConfig {
    &DEFAULT_CONFIG
}

/// Root configuration for all calculators.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bracketed root-finding options (Mach inversion)
    pub solver: SolverOptions,
    /// Nozzle contour constants
    pub nozzle: NozzleConfig,
    /// Structural policy factors
    pub structure: StructureConfig,
    /// Performance goal-seek constants and tables
    pub performance: PerformanceConfig,
}

impl EngineConfig {
    /// Parse a (possibly partial) TOML override and validate it.
    pub fn from_toml_str(text: &str) -> CalcResult<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML override file from disk.
    pub fn load(path: &Path) -> CalcResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CalcError::config(format!("cannot read '{}': {}", path.display(), e)))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded engine configuration");
        Ok(config)
    }

    /// Check internal consistency of the tables.
    pub fn validate(&self) -> CalcResult<()> {
        self.solver.validate()?;
        self.nozzle.validate()?;
        self.structure.validate()?;
        self.performance.validate()
    }
}

// ============================================================================
// Root finding
// ============================================================================

/// Options for bounded bracketed root-finding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Relative tolerance on the target value
    pub tolerance: f64,
    /// Hard cap on iterations
    pub max_iterations: u32,
    /// Upper end of the supersonic bracket
    pub max_mach: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            tolerance: 1e-10,
            max_iterations: 200,
            max_mach: 50.0,
        }
    }
}

impl SolverOptions {
    fn validate(&self) -> CalcResult<()> {
        if !(self.tolerance > 0.0) {
            return Err(CalcError::config("solver.tolerance must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(CalcError::config("solver.max_iterations must be at least 1"));
        }
        if !(self.max_mach > 1.0) {
            return Err(CalcError::config("solver.max_mach must exceed 1"));
        }
        Ok(())
    }
}

// ============================================================================
// Nozzle
// ============================================================================

/// Bell-nozzle angles at a reference expansion ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaoAngles {
    pub area_ratio: f64,
    /// Initial divergence angle θn at the end of the throat arc
    pub initial_angle_deg: f64,
    /// Exit lip angle θe
    pub exit_angle_deg: f64,
}

/// Nozzle contour constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NozzleConfig {
    /// Half-angle of the conical nozzle and of the reference cone
    pub cone_half_angle_deg: f64,
    /// Bell length as a fraction of the reference cone length
    pub bell_length_fraction: f64,
    /// Throat downstream arc radius as a multiple of throat radius
    pub throat_arc_radius_ratio: f64,
    /// Stations along the cone, or along the bell curve
    pub contour_stations: usize,
    /// Stations on the throat arc (parabolic contour only)
    pub throat_arc_stations: usize,
    /// θn / θe against ε, sorted by area ratio
    pub rao_angles: Vec<RaoAngles>,
}

impl Default for NozzleConfig {
    fn default() -> Self {
        let rao = |area_ratio, initial_angle_deg, exit_angle_deg| RaoAngles {
            area_ratio,
            initial_angle_deg,
            exit_angle_deg,
        };
        NozzleConfig {
            cone_half_angle_deg: 15.0,
            bell_length_fraction: 0.8,
            throat_arc_radius_ratio: 0.382,
            contour_stations: 50,
            throat_arc_stations: 10,
            rao_angles: vec![
                rao(4.0, 21.5, 14.0),
                rao(10.0, 26.3, 11.0),
                rao(20.0, 28.8, 9.0),
                rao(50.0, 31.5, 7.5),
                rao(100.0, 33.5, 7.0),
            ],
        }
    }
}

impl NozzleConfig {
    fn validate(&self) -> CalcResult<()> {
        if !(self.cone_half_angle_deg > 0.0 && self.cone_half_angle_deg < 90.0) {
            return Err(CalcError::config("nozzle.cone_half_angle_deg must be in (0, 90)"));
        }
        if !(self.bell_length_fraction > 0.0 && self.bell_length_fraction <= 1.0) {
            return Err(CalcError::config("nozzle.bell_length_fraction must be in (0, 1]"));
        }
        if self.contour_stations < 2 || self.throat_arc_stations < 2 {
            return Err(CalcError::config("nozzle contour needs at least 2 stations per segment"));
        }
        if self.rao_angles.is_empty() {
            return Err(CalcError::config("nozzle.rao_angles must not be empty"));
        }
        if self.rao_angles.windows(2).any(|w| w[1].area_ratio <= w[0].area_ratio) {
            return Err(CalcError::config("nozzle.rao_angles must be sorted by increasing area_ratio"));
        }
        if self
            .rao_angles
            .iter()
            .any(|r| r.exit_angle_deg <= 0.0 || r.initial_angle_deg <= r.exit_angle_deg || r.initial_angle_deg >= 90.0)
        {
            return Err(CalcError::config("nozzle.rao_angles need 0 < exit angle < initial angle < 90"));
        }
        Ok(())
    }
}

// ============================================================================
// Structure
// ============================================================================

/// Edge condition of the bulkhead plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlateEdge {
    /// Fixed at the case inner radius: σmax = 3pr²/(4t²)
    Clamped,
    /// Free to rotate at the edge: σmax = 3(3+ν)pr²/(8t²)
    SimplySupported,
}

/// Structural policy factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Case FS below this attaches an advisory
    pub min_case_factor_of_safety: f64,
    /// Design FS used when the request does not give one
    pub default_design_factor: f64,
    /// Bulkhead edge condition
    pub plate_edge: PlateEdge,
    /// Poisson ratio for the simply-supported plate
    pub poisson_ratio: f64,
}

impl Default for StructureConfig {
    fn default() -> Self {
        StructureConfig {
            min_case_factor_of_safety: 2.0,
            default_design_factor: 2.0,
            plate_edge: PlateEdge::Clamped,
            poisson_ratio: 0.3,
        }
    }
}

impl StructureConfig {
    fn validate(&self) -> CalcResult<()> {
        if !(self.min_case_factor_of_safety > 0.0) {
            return Err(CalcError::config("structure.min_case_factor_of_safety must be positive"));
        }
        if !(self.default_design_factor >= 1.0) {
            return Err(CalcError::config("structure.default_design_factor must be at least 1"));
        }
        if !(self.poisson_ratio > 0.0 && self.poisson_ratio < 0.5) {
            return Err(CalcError::config("structure.poisson_ratio must be in (0, 0.5)"));
        }
        Ok(())
    }
}

// ============================================================================
// Performance
// ============================================================================

/// One row of the drag reduction correlation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragFactorRow {
    /// Drag influence number
    pub n: f64,
    /// Peak altitude factor fz
    pub altitude: f64,
    /// Burnout altitude factor fzbo
    pub burnout_altitude: f64,
    /// Burnout velocity factor fv
    pub velocity: f64,
    /// Time to apogee factor ft
    pub time: f64,
}

/// Goal-seek constants, drag correlation and advisory thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// g0 (m/s²)
    pub standard_gravity: f64,
    /// Sea-level speed of sound used for burnout Mach (m/s)
    pub sea_level_sound_speed: f64,
    /// Relative change in total impulse that ends the iteration
    pub impulse_tolerance: f64,
    /// Iteration cap for the goal seek
    pub max_iterations: u32,
    /// Upper impulse bound of class A (N·s); each letter doubles it
    pub class_a_upper_impulse: f64,
    /// Below this mass fraction an advisory is attached
    pub min_mass_fraction: f64,
    /// Above this mass fraction an advisory is attached
    pub max_mass_fraction: f64,
    /// Peak acceleration sanity bound (g)
    pub max_acceleration_g: f64,
    /// Highest credible Isp for amateur solid propellants (s)
    pub max_specific_impulse_s: f64,
    /// Drag reduction factors against N, sorted by N, starting at N = 0
    pub drag_table: Vec<DragFactorRow>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        let row = |n, altitude, burnout_altitude, velocity, time| DragFactorRow {
            n,
            altitude,
            burnout_altitude,
            velocity,
            time,
        };
        PerformanceConfig {
            standard_gravity: 9.81,
            sea_level_sound_speed: 340.0,
            impulse_tolerance: 1e-4,
            max_iterations: 50,
            class_a_upper_impulse: 2.5,
            min_mass_fraction: 0.05,
            max_mass_fraction: 0.40,
            max_acceleration_g: 60.0,
            max_specific_impulse_s: 260.0,
            // Nakka, "Drag Reduction Factors" chart
            drag_table: vec![
                row(0.0, 1.000, 1.000, 1.000, 1.000),
                row(50.0, 0.910, 0.998, 0.995, 0.940),
                row(100.0, 0.840, 0.995, 0.990, 0.890),
                row(150.0, 0.780, 0.992, 0.985, 0.850),
                row(200.0, 0.720, 0.990, 0.980, 0.810),
                row(300.0, 0.630, 0.985, 0.970, 0.750),
                row(400.0, 0.570, 0.980, 0.960, 0.700),
                row(500.0, 0.520, 0.975, 0.950, 0.660),
                row(600.0, 0.480, 0.970, 0.945, 0.630),
                row(700.0, 0.450, 0.965, 0.940, 0.600),
                row(800.0, 0.420, 0.960, 0.935, 0.580),
                row(900.0, 0.405, 0.955, 0.930, 0.570),
                row(1000.0, 0.400, 0.950, 0.925, 0.560),
            ],
        }
    }
}

impl PerformanceConfig {
    /// Largest N the correlation was calibrated for.
    pub fn calibrated_n_max(&self) -> f64 {
        self.drag_table.last().map(|r| r.n).unwrap_or(0.0)
    }

    fn validate(&self) -> CalcResult<()> {
        if !(self.standard_gravity > 0.0) || !(self.sea_level_sound_speed > 0.0) {
            return Err(CalcError::config("performance gravity and sound speed must be positive"));
        }
        if !(self.impulse_tolerance > 0.0) || self.max_iterations == 0 {
            return Err(CalcError::config("performance tolerance and max_iterations must be positive"));
        }
        if !(self.class_a_upper_impulse > 0.0) {
            return Err(CalcError::config("performance.class_a_upper_impulse must be positive"));
        }
        if self.min_mass_fraction >= self.max_mass_fraction {
            return Err(CalcError::config("performance mass fraction range is empty"));
        }
        let Some(first) = self.drag_table.first() else {
            return Err(CalcError::config("performance.drag_table must not be empty"));
        };
        if first.n != 0.0 {
            return Err(CalcError::config("performance.drag_table must start at N = 0"));
        }
        if self.drag_table.windows(2).any(|w| w[1].n <= w[0].n) {
            return Err(CalcError::config("performance.drag_table must be sorted by increasing N"));
        }
        let in_range = |f: f64| f > 0.0 && f <= 1.0;
        if self
            .drag_table
            .iter()
            .any(|r| !(in_range(r.altitude) && in_range(r.burnout_altitude) && in_range(r.velocity) && in_range(r.time)))
        {
            return Err(CalcError::config("performance.drag_table factors must be in (0, 1]"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(defaults().validate().is_ok());
        assert_eq!(defaults().nozzle.cone_half_angle_deg, 15.0);
        assert_eq!(defaults().performance.max_iterations, 50);
        assert_eq!(defaults().performance.calibrated_n_max(), 1000.0);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(&config, defaults());
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str(
            r#"
            [nozzle]
            contour_stations = 120

            [structure]
            plate_edge = "simply_supported"
            "#,
        )
        .unwrap();
        assert_eq!(config.nozzle.contour_stations, 120);
        assert_eq!(config.nozzle.throat_arc_stations, 10);
        assert_eq!(config.structure.plate_edge, PlateEdge::SimplySupported);
        assert_eq!(config.performance, PerformanceConfig::default());
    }

    #[test]
    fn test_unsorted_drag_table_rejected() {
        let err = EngineConfig::from_toml_str(
            r#"
            [performance]
            drag_table = [
                { n = 0.0, altitude = 1.0, burnout_altitude = 1.0, velocity = 1.0, time = 1.0 },
                { n = 500.0, altitude = 0.5, burnout_altitude = 0.9, velocity = 0.9, time = 0.6 },
                { n = 100.0, altitude = 0.8, burnout_altitude = 0.9, velocity = 0.9, time = 0.8 },
            ]
            "#,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = EngineConfig::from_toml_str("[nozzle\ncone_half_angle_deg = ").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = EngineConfig::load(Path::new("/nonexistent/motor.toml")).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
