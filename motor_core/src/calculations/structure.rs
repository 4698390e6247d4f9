//! # Structural Verification
//!
//! Checks a motor case as a closed-end cylindrical pressure vessel, sizes the
//! flat bulkhead that closes it, and counts the radial bolts that retain the
//! bulkhead.
//!
//! ## Assumptions
//!
//! - Stresses evaluated at the bore, where they peak
//! - Thin-wall (default) or Lamé thick-wall cylinder
//! - Bulkhead is a flat circular plate at the case inner radius, clamped by
//!   default
//! - Bolts in single shear on the nominal diameter; all bolts share the
//!   closure force equally
//!
//! ## Policy
//!
//! A factor of safety below the configured minimum is an advisory, not an
//! error: the full result is still returned.
//!
//! ## Example
//!
//! ```rust
//! use motor_core::calculations::structure::{analyze, PressureVesselSpec};
//!
//! let spec = PressureVesselSpec::from_presentation_units(3.175, 76.2, 7.0, 150.0, 205.0, 6.0, 6.5, 400.0);
//! let result = analyze(&spec).unwrap();
//!
//! println!("Von Mises: {:.1} MPa", result.von_mises_stress_pa / 1e6);
//! println!("Case FS: {:.2}", result.factor_of_safety);
//! println!("Bolts: {}", result.bolt_count);
//! assert!(result.bolt_count >= 1);
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::calculations::Advisory;
use crate::config::{self, EngineConfig, PlateEdge};
use crate::equations::pressure_vessel::{
    circle_area, closure_force, lame_inner_surface_stresses, plate_thickness, required_bolts, shear_yield,
    simply_supported_plate_coefficient, thin_wall_hoop_stress, thin_wall_longitudinal_stress, von_mises_stress,
    CLAMPED_PLATE_COEFFICIENT,
};
use crate::errors::{CalcError, CalcResult};
use crate::units::{MegaPascals, Meters, Millimeters, Pascals};

/// Cylinder stress model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallModel {
    /// σt = p·di/(2e), σl = p·di/(4e), σr = −p
    #[default]
    ThinWall,
    /// Lamé stresses at the bore
    ThickWall,
}

/// Motor case, bulkhead and bolt inputs (SI).
///
/// ## JSON Example
///
/// ```json
/// {
///   "wall_thickness_m": 0.003175,
///   "outer_diameter_m": 0.0762,
///   "max_operating_pressure_pa": 7000000.0,
///   "case_yield_pa": 150000000.0,
///   "bulkhead_yield_pa": 205000000.0,
///   "bolt_nominal_diameter_m": 0.006,
///   "bolt_hole_diameter_m": 0.0065,
///   "bolt_yield_pa": 400000000.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureVesselSpec {
    /// Case wall thickness e (m)
    pub wall_thickness_m: f64,

    /// Case outer diameter (m)
    pub outer_diameter_m: f64,

    /// Maximum expected operating pressure (Pa)
    pub max_operating_pressure_pa: f64,

    /// Case material yield strength (Pa)
    pub case_yield_pa: f64,

    /// Bulkhead material yield strength (Pa)
    pub bulkhead_yield_pa: f64,

    /// Bolt nominal (shank) diameter (m)
    pub bolt_nominal_diameter_m: f64,

    /// Bolt hole diameter drilled in the case (m)
    pub bolt_hole_diameter_m: f64,

    /// Bolt material yield strength (Pa)
    pub bolt_yield_pa: f64,

    /// Target factor of safety for bulkhead and bolts; unset uses the
    /// configured default (2.0)
    #[serde(default)]
    pub design_factor: Option<f64>,

    /// Cylinder stress model
    #[serde(default)]
    pub wall_model: WallModel,
}

impl PressureVesselSpec {
    /// Build a spec from the units used on the verification form:
    /// millimetres for lengths, megapascals for pressure and strengths.
    #[allow(clippy::too_many_arguments)]
    pub fn from_presentation_units(
        wall_thickness_mm: f64,
        outer_diameter_mm: f64,
        max_pressure_mpa: f64,
        case_yield_mpa: f64,
        bulkhead_yield_mpa: f64,
        bolt_nominal_diameter_mm: f64,
        bolt_hole_diameter_mm: f64,
        bolt_yield_mpa: f64,
    ) -> Self {
        let m = |mm: f64| Meters::from(Millimeters(mm)).value();
        let pa = |mpa: f64| Pascals::from(MegaPascals(mpa)).value();
        PressureVesselSpec {
            wall_thickness_m: m(wall_thickness_mm),
            outer_diameter_m: m(outer_diameter_mm),
            max_operating_pressure_pa: pa(max_pressure_mpa),
            case_yield_pa: pa(case_yield_mpa),
            bulkhead_yield_pa: pa(bulkhead_yield_mpa),
            bolt_nominal_diameter_m: m(bolt_nominal_diameter_mm),
            bolt_hole_diameter_m: m(bolt_hole_diameter_mm),
            bolt_yield_pa: pa(bolt_yield_mpa),
            design_factor: None,
            wall_model: WallModel::ThinWall,
        }
    }

    /// Inner diameter di = do − 2e (m)
    pub fn inner_diameter_m(&self) -> f64 {
        self.outer_diameter_m - 2.0 * self.wall_thickness_m
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        let lengths = [
            ("wall_thickness_m", self.wall_thickness_m),
            ("outer_diameter_m", self.outer_diameter_m),
            ("bolt_nominal_diameter_m", self.bolt_nominal_diameter_m),
            ("bolt_hole_diameter_m", self.bolt_hole_diameter_m),
        ];
        for (field, value) in lengths {
            if !(value > 0.0) || !value.is_finite() {
                return Err(CalcError::non_physical_geometry(field, value.to_string(), "Dimension must be positive"));
            }
        }

        let strengths = [
            ("max_operating_pressure_pa", self.max_operating_pressure_pa),
            ("case_yield_pa", self.case_yield_pa),
            ("bulkhead_yield_pa", self.bulkhead_yield_pa),
            ("bolt_yield_pa", self.bolt_yield_pa),
        ];
        for (field, value) in strengths {
            if !(value > 0.0) || !value.is_finite() {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }

        if self.inner_diameter_m() <= 0.0 {
            return Err(CalcError::non_physical_geometry(
                "outer_diameter_m",
                self.outer_diameter_m.to_string(),
                format!(
                    "Outer diameter must exceed twice the wall thickness ({} m)",
                    2.0 * self.wall_thickness_m
                ),
            ));
        }
        if self.bolt_hole_diameter_m < self.bolt_nominal_diameter_m {
            return Err(CalcError::non_physical_geometry(
                "bolt_hole_diameter_m",
                self.bolt_hole_diameter_m.to_string(),
                format!(
                    "Hole cannot be smaller than the bolt ({} m)",
                    self.bolt_nominal_diameter_m
                ),
            ));
        }
        if let Some(fs) = self.design_factor {
            if !(fs >= 1.0) || !fs.is_finite() {
                return Err(CalcError::invalid_input(
                    "design_factor",
                    fs.to_string(),
                    "Design factor of safety must be at least 1",
                ));
            }
        }
        Ok(())
    }
}

/// Results from structural verification.
///
/// ## JSON Example (abridged)
///
/// ```json
/// {
///   "inner_diameter_m": 0.06985,
///   "hoop_stress_pa": 77000000.0,
///   "longitudinal_stress_pa": 38500000.0,
///   "radial_stress_pa": -7000000.0,
///   "von_mises_stress_pa": 72900000.0,
///   "factor_of_safety": 2.06,
///   "bulkhead_thickness_m": 0.0053,
///   "bolt_count": 9,
///   "warnings": []
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressResult {
    // === Case ===
    /// Inner diameter (m)
    pub inner_diameter_m: f64,
    /// Stress model used
    pub wall_model: WallModel,
    /// Hoop (tangential) stress at the bore (Pa)
    pub hoop_stress_pa: f64,
    /// Radial stress at the bore (Pa, compressive)
    pub radial_stress_pa: f64,
    /// Longitudinal stress (Pa)
    pub longitudinal_stress_pa: f64,
    /// Von Mises equivalent stress (Pa)
    pub von_mises_stress_pa: f64,
    /// Case FS = case yield / von Mises stress
    pub factor_of_safety: f64,

    // === Bulkhead ===
    /// Target FS applied to bulkhead and bolts
    pub design_factor: f64,
    /// Required bulkhead plate thickness (m)
    pub bulkhead_thickness_m: f64,

    // === Bolts ===
    /// Pressurized closure area π·di²/4 (m²)
    pub closure_area_m2: f64,
    /// Total separating force the bolts carry (N)
    pub bolt_axial_force_n: f64,
    /// Bolt shear yield σy/√3 (Pa)
    pub bolt_shear_yield_pa: f64,
    /// Allowable shear stress τy/FS (Pa)
    pub allowable_bolt_shear_pa: f64,
    /// Unrounded bolt requirement
    pub bolt_count_required: f64,
    /// Bolts to install (rounded up, at least 1)
    pub bolt_count: u32,
    /// Load per installed bolt (N)
    pub force_per_bolt_n: f64,
    /// Shear stress in each installed bolt (Pa)
    pub bolt_shear_stress_pa: f64,
    /// Bolt shear FS at the installed count
    pub bolt_factor_of_safety: f64,

    // === Case at the bolt row ===
    /// Bearing stress of a bolt on the case wall (Pa)
    pub bearing_stress_pa: f64,
    /// Bearing FS against case yield
    pub bearing_factor_of_safety: f64,
    /// Longitudinal stress in the case through the bolt-hole row (Pa)
    pub net_section_stress_pa: f64,
    /// Net-section FS against case yield
    pub net_section_factor_of_safety: f64,

    /// Advisories (low factors of safety)
    pub warnings: Vec<Advisory>,
}

impl StressResult {
    /// True when no factor of safety fell below the configured minimum
    pub fn passes(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Lowest factor of safety across the case checks
    pub fn governing_factor_of_safety(&self) -> f64 {
        self.factor_of_safety
            .min(self.bearing_factor_of_safety)
            .min(self.net_section_factor_of_safety)
    }
}

/// Analyze a pressure vessel with the default engine configuration.
pub fn analyze(spec: &PressureVesselSpec) -> CalcResult<StressResult> {
    analyze_with(spec, config::defaults())
}

/// Analyze a pressure vessel with an explicit engine configuration.
///
/// Closed form throughout; no iteration.
pub fn analyze_with(spec: &PressureVesselSpec, config: &EngineConfig) -> CalcResult<StressResult> {
    spec.validate()?;
    let cfg = &config.structure;

    let p = spec.max_operating_pressure_pa;
    let e = spec.wall_thickness_m;
    let di = spec.inner_diameter_m();
    let design_factor = spec.design_factor.unwrap_or(cfg.default_design_factor);

    // Case
    let (hoop, longitudinal, radial) = match spec.wall_model {
        WallModel::ThinWall => (
            thin_wall_hoop_stress(p, di, e),
            thin_wall_longitudinal_stress(p, di, e),
            -p,
        ),
        WallModel::ThickWall => lame_inner_surface_stresses(p, di / 2.0, spec.outer_diameter_m / 2.0),
    };
    let von_mises = von_mises_stress(longitudinal, radial, hoop);
    let factor_of_safety = spec.case_yield_pa / von_mises;

    // Bulkhead
    let coefficient = match cfg.plate_edge {
        PlateEdge::Clamped => CLAMPED_PLATE_COEFFICIENT,
        PlateEdge::SimplySupported => simply_supported_plate_coefficient(cfg.poisson_ratio),
    };
    let bulkhead_thickness_m = plate_thickness(coefficient, p, di / 2.0, design_factor, spec.bulkhead_yield_pa);

    // Bolts
    let closure_area_m2 = PI * (di / 2.0).powi(2);
    let force = closure_force(p, di);
    let bolt_area = circle_area(spec.bolt_nominal_diameter_m);
    let tau_y = shear_yield(spec.bolt_yield_pa);
    let bolt_count_required = required_bolts(force, design_factor, bolt_area, tau_y);
    let bolt_count = (bolt_count_required.ceil() as u32).max(1);
    let force_per_bolt_n = force / f64::from(bolt_count);
    let bolt_shear_stress_pa = force_per_bolt_n / bolt_area;

    // Case wall around the bolt row
    let bearing_stress_pa = force_per_bolt_n / (spec.bolt_nominal_diameter_m * e);
    let mean_circumference = PI * (spec.outer_diameter_m - e);
    let ligament = mean_circumference - f64::from(bolt_count) * spec.bolt_hole_diameter_m;
    if ligament <= 0.0 {
        return Err(CalcError::non_physical_geometry(
            "bolt_hole_diameter_m",
            spec.bolt_hole_diameter_m.to_string(),
            format!(
                "{} holes do not fit around the case circumference ({:.4} m)",
                bolt_count, mean_circumference
            ),
        ));
    }
    let net_section_stress_pa = force / (ligament * e);

    let result = StressResult {
        inner_diameter_m: di,
        wall_model: spec.wall_model,
        hoop_stress_pa: hoop,
        radial_stress_pa: radial,
        longitudinal_stress_pa: longitudinal,
        von_mises_stress_pa: von_mises,
        factor_of_safety,
        design_factor,
        bulkhead_thickness_m,
        closure_area_m2,
        bolt_axial_force_n: force,
        bolt_shear_yield_pa: tau_y,
        allowable_bolt_shear_pa: tau_y / design_factor,
        bolt_count_required,
        bolt_count,
        force_per_bolt_n,
        bolt_shear_stress_pa,
        bolt_factor_of_safety: tau_y / bolt_shear_stress_pa,
        bearing_stress_pa,
        bearing_factor_of_safety: spec.case_yield_pa / bearing_stress_pa,
        net_section_stress_pa,
        net_section_factor_of_safety: spec.case_yield_pa / net_section_stress_pa,
        warnings: Vec::new(),
    };
    let warnings = factor_of_safety_advisories(&result, cfg.min_case_factor_of_safety);
    for warning in &warnings {
        tracing::warn!(code = warning.code(), "{}", warning);
    }

    tracing::info!(
        von_mises_pa = von_mises,
        factor_of_safety,
        bolt_count,
        "structure analyzed"
    );

    Ok(StressResult { warnings, ..result })
}

fn factor_of_safety_advisories(result: &StressResult, minimum: f64) -> Vec<Advisory> {
    [
        ("case", result.factor_of_safety),
        ("bolt_bearing", result.bearing_factor_of_safety),
        ("net_section", result.net_section_factor_of_safety),
    ]
    .into_iter()
    .filter(|&(_, fs)| fs < minimum)
    .map(|(check, fs)| Advisory::LowFactorOfSafety {
        check: check.to_string(),
        factor_of_safety: fs,
        minimum,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_spec() -> PressureVesselSpec {
        PressureVesselSpec::from_presentation_units(3.175, 76.2, 7.0, 150.0, 205.0, 6.0, 6.5, 400.0)
    }

    #[test]
    fn test_hoop_stress_reference() {
        let result = analyze(&reference_spec()).unwrap();
        // di = 76.2 − 6.35 = 69.85 mm; σt = 7·69.85/(2·3.175) = 77 MPa
        assert!((result.inner_diameter_m - 0.06985).abs() < 1e-12);
        let expected = 7.0e6 * result.inner_diameter_m / (2.0 * 0.003175);
        assert_eq!(result.hoop_stress_pa, expected);
        assert!((result.hoop_stress_pa - 77.0e6).abs() < 1.0);
        assert!((result.longitudinal_stress_pa - 38.5e6).abs() < 1.0);
        assert_eq!(result.radial_stress_pa, -7.0e6);
    }

    #[test]
    fn test_von_mises_and_factor_of_safety() {
        let result = analyze(&reference_spec()).unwrap();
        let (t, l, r): (f64, f64, f64) = (77.0e6, 38.5e6, -7.0e6);
        let expected = (((l - r) * (l - r) + (r - t) * (r - t) + (t - l) * (t - l)) / 2.0).sqrt();
        assert!((result.von_mises_stress_pa - expected).abs() < 1.0);
        assert!((result.factor_of_safety - 150.0e6 / expected).abs() < 1e-9);
        // ≈ 72.9 MPa, FS ≈ 2.06 - just above the minimum
        assert!(result.factor_of_safety > 2.0);
        assert!(!result.warnings.iter().any(|w| matches!(
            w,
            Advisory::LowFactorOfSafety { check, .. } if check == "case"
        )));
    }

    #[test]
    fn test_bolt_row_checks() {
        let result = analyze(&reference_spec()).unwrap();
        // 9 bolts share 26.8 kN; bearing on a 6 mm × 3.175 mm face
        let per_bolt = result.bolt_axial_force_n / 9.0;
        assert!((result.force_per_bolt_n - per_bolt).abs() < 1e-9);
        assert!((result.bearing_stress_pa - per_bolt / (0.006 * 0.003175)).abs() < 1e-3);
        // Ligament: π(76.2 − 3.175) mm less 9 holes of 6.5 mm
        let ligament = PI * (0.0762 - 0.003175) - 9.0 * 0.0065;
        let expected = result.bolt_axial_force_n / (ligament * 0.003175);
        assert!((result.net_section_stress_pa - expected).abs() < 1e-3);
        assert!(result.net_section_factor_of_safety > 2.0);
        // Bearing governs for thin aluminium cases
        assert!(result.bearing_factor_of_safety < 2.0);
        assert_eq!(result.governing_factor_of_safety(), result.bearing_factor_of_safety);
        assert!(!result.passes());
    }

    #[test]
    fn test_bulkhead_thickness_clamped() {
        let result = analyze(&reference_spec()).unwrap();
        let r = 0.06985 / 2.0;
        let expected = r * (0.75_f64 * 7.0e6 * 2.0 / 205.0e6).sqrt();
        assert!((result.bulkhead_thickness_m - expected).abs() < 1e-12);
    }

    #[test]
    fn test_simply_supported_bulkhead_is_thicker() {
        let clamped = analyze(&reference_spec()).unwrap();
        let mut config = EngineConfig::default();
        config.structure.plate_edge = PlateEdge::SimplySupported;
        let simple = analyze_with(&reference_spec(), &config).unwrap();
        assert!(simple.bulkhead_thickness_m > clamped.bulkhead_thickness_m);
    }

    #[test]
    fn test_bolt_count_rounds_up() {
        let result = analyze(&reference_spec()).unwrap();
        // Unrounded requirement ≈ 8.22 → 9 bolts
        assert!((result.bolt_count_required - 8.216).abs() < 0.01);
        assert_eq!(result.bolt_count, 9);
        assert!(result.bolt_shear_stress_pa <= result.allowable_bolt_shear_pa);
        assert!(result.bolt_factor_of_safety >= result.design_factor);
    }

    #[test]
    fn test_bolt_count_at_least_one() {
        let mut spec = reference_spec();
        spec.max_operating_pressure_pa = 1_000.0;
        let result = analyze(&spec).unwrap();
        assert_eq!(result.bolt_count, 1);
    }

    #[test]
    fn test_low_factor_of_safety_is_advisory() {
        let mut spec = reference_spec();
        spec.case_yield_pa = 100.0e6;
        let result = analyze(&spec).unwrap();
        assert!(result.factor_of_safety < 2.0);
        assert!(!result.passes());
        assert!(result.warnings.iter().any(|w| matches!(
            w,
            Advisory::LowFactorOfSafety { check, .. } if check == "case"
        )));
    }

    #[test]
    fn test_thick_wall_is_more_severe() {
        let thin = analyze(&reference_spec()).unwrap();
        let mut spec = reference_spec();
        spec.wall_model = WallModel::ThickWall;
        let thick = analyze(&spec).unwrap();
        // Lamé hoop at the bore exceeds the mean thin-wall value
        assert!(thick.hoop_stress_pa > thin.hoop_stress_pa);
        assert_eq!(thick.radial_stress_pa, -7.0e6);
        assert_eq!(thick.bolt_count, thin.bolt_count);
    }

    #[test]
    fn test_non_physical_geometry() {
        let mut spec = reference_spec();
        spec.outer_diameter_m = 2.0 * spec.wall_thickness_m;
        let err = analyze(&spec).unwrap_err();
        assert_eq!(err.error_code(), "NON_PHYSICAL_GEOMETRY");

        let mut spec = reference_spec();
        spec.bolt_hole_diameter_m = 0.005;
        assert_eq!(analyze(&spec).unwrap_err().error_code(), "NON_PHYSICAL_GEOMETRY");
    }

    #[test]
    fn test_bolt_row_must_fit() {
        let mut spec = reference_spec();
        // Tiny bolts: many needed, and 20 mm holes cannot all fit
        spec.bolt_nominal_diameter_m = 0.002;
        spec.bolt_hole_diameter_m = 0.02;
        let err = analyze(&spec).unwrap_err();
        assert_eq!(err.error_code(), "NON_PHYSICAL_GEOMETRY");
    }

    #[test]
    fn test_invalid_design_factor() {
        let mut spec = reference_spec();
        spec.design_factor = Some(0.5);
        assert_eq!(analyze(&spec).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_serialization() {
        let spec = reference_spec();
        let json = serde_json::to_string(&spec).unwrap();
        let roundtrip: PressureVesselSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, roundtrip);

        let result = analyze(&spec).unwrap();
        let json = serde_json::to_string_pretty(&result).unwrap();
        assert!(json.contains("von_mises_stress_pa"));
        assert!(json.contains("\"bolt_count\": 9"));
    }
}
