//! # Nozzle Design
//!
//! Sizes a converging-diverging nozzle for a thrust target and produces its
//! wall contour.
//!
//! ## Assumptions
//!
//! - Quasi-1-D isentropic flow of a calorically perfect gas, choked throat
//! - Momentum thrust only at the design point: mdot = F/ve
//! - Without an expansion ratio override the nozzle is ideally expanded
//!   (exit static pressure equals ambient)
//! - Conical contour: straight wall at the configured half-angle (15°)
//! - Parabolic contour: Rao-type bell approximated by a circular throat arc
//!   followed by a quadratic Bézier, at 80 % of the 15° cone length. Where no
//!   bell fits (ε barely above 1) the conical wall is used and a
//!   `ContourFallback` advisory says so
//!
//! ## Example
//!
//! ```rust
//! use motor_core::calculations::nozzle::{design, ContourType, NozzleSpec};
//! use motor_core::equations::ChamberState;
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
//! let geometry = design(&chamber, &spec).unwrap();
//! println!("Throat radius: {:.2} mm", geometry.throat_radius_m * 1000.0);
//! println!("Exit radius: {:.2} mm", geometry.exit_radius_m * 1000.0);
//! assert_eq!(geometry.contour_points[0].radius_m, geometry.throat_radius_m);
//! ```

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::calculations::Advisory;
use crate::config::{self, EngineConfig, NozzleConfig};
use crate::equations::gas_dynamics::{
    area_ratio_from_mach, characteristic_velocity, choked_mass_flux, exhaust_velocity, mach_from_area_ratio,
    mach_from_pressure_ratio, pressure_ratio_from_mach, temperature_ratio_from_mach, throat_conditions,
    thrust_coefficient, ChamberState, FlowBranch,
};
use crate::equations::numeric::{interpolate, linspace};
use crate::errors::{CalcError, CalcResult};

/// Exit pressure below this fraction of ambient risks flow separation
/// (Summerfield criterion).
const SEPARATION_PRESSURE_RATIO: f64 = 0.4;

/// Wall contour family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourType {
    #[default]
    Conical,
    Parabolic,
}

/// Nozzle design request.
///
/// ## JSON Example
///
/// ```json
/// {
///   "thrust_target_n": 544.81,
///   "ambient_pressure_pa": 101320.0,
///   "contour_type": "parabolic",
///   "expansion_ratio": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NozzleSpec {
    /// Design thrust (N)
    pub thrust_target_n: f64,

    /// Ambient pressure at the design altitude (Pa)
    pub ambient_pressure_pa: f64,

    /// Conical or parabolic (bell) wall
    #[serde(default)]
    pub contour_type: ContourType,

    /// Optional exit-to-throat area ratio. `None` means optimum expansion to
    /// ambient pressure.
    #[serde(default)]
    pub expansion_ratio: Option<f64>,
}

impl NozzleSpec {
    /// Validate the request against the chamber it will be designed for.
    ///
    /// Runs before any solver so bad input is never reported as a solver
    /// failure.
    pub fn validate(&self, chamber: &ChamberState) -> CalcResult<()> {
        if !(self.thrust_target_n > 0.0) || !self.thrust_target_n.is_finite() {
            return Err(CalcError::invalid_nozzle_spec(
                "thrust_target_n",
                self.thrust_target_n.to_string(),
                "Thrust target must be positive",
            ));
        }
        if !(self.ambient_pressure_pa >= 0.0) || !self.ambient_pressure_pa.is_finite() {
            return Err(CalcError::invalid_nozzle_spec(
                "ambient_pressure_pa",
                self.ambient_pressure_pa.to_string(),
                "Ambient pressure cannot be negative",
            ));
        }
        if !(chamber.gamma > 1.0) || !chamber.gamma.is_finite() {
            return Err(CalcError::invalid_nozzle_spec(
                "gamma",
                chamber.gamma.to_string(),
                "Ratio of specific heats must exceed 1",
            ));
        }
        // Below the critical ratio the throat cannot choke and the exit stays subsonic
        let choking_pressure_pa = pressure_ratio_from_mach(1.0, chamber.gamma) * self.ambient_pressure_pa;
        if !(chamber.p0_pa > choking_pressure_pa) {
            return Err(CalcError::invalid_nozzle_spec(
                "p0_pa",
                chamber.p0_pa.to_string(),
                format!(
                    "Chamber pressure must exceed {:.0} Pa (critical pressure ratio times ambient) to choke the throat",
                    choking_pressure_pa
                ),
            ));
        }
        match self.expansion_ratio {
            Some(eps) if !(eps > 1.0) || !eps.is_finite() => {
                return Err(CalcError::invalid_nozzle_spec(
                    "expansion_ratio",
                    eps.to_string(),
                    "Expansion ratio must exceed 1",
                ));
            }
            None if self.ambient_pressure_pa == 0.0 => {
                return Err(CalcError::invalid_nozzle_spec(
                    "ambient_pressure_pa",
                    "0",
                    "Optimum expansion to vacuum is unbounded - supply an expansion ratio",
                ));
            }
            _ => {}
        }
        chamber.validate()
    }
}

/// One station on the nozzle wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContourPoint {
    /// Axial distance downstream of the throat (m)
    pub axial_position_m: f64,
    /// Wall radius (m)
    pub radius_m: f64,
    /// Flow area πr² (m²)
    pub area_m2: f64,
}

impl ContourPoint {
    fn new(axial_position_m: f64, radius_m: f64) -> Self {
        ContourPoint {
            axial_position_m,
            radius_m,
            area_m2: PI * radius_m * radius_m,
        }
    }
}

/// Nozzle design results.
///
/// Geometry first, then the flow state that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NozzleGeometry {
    // === Geometry ===
    /// Throat radius (m)
    pub throat_radius_m: f64,
    /// Exit radius (m)
    pub exit_radius_m: f64,
    /// Throat-to-exit axial length (m)
    pub axial_length_m: f64,
    /// Exit-to-throat area ratio ε, recomputed from the exit Mach number
    pub expansion_ratio: f64,
    /// Throat area At (m²)
    pub throat_area_m2: f64,
    /// Exit area Ae (m²)
    pub exit_area_m2: f64,
    /// Wall angle leaving the throat region (deg)
    pub initial_wall_angle_deg: f64,
    /// Wall angle at the exit lip (deg)
    pub exit_wall_angle_deg: f64,
    /// Wall stations from throat to exit, radius non-decreasing
    pub contour_points: Vec<ContourPoint>,

    // === Flow ===
    /// Exit Mach number
    pub exit_mach: f64,
    /// Exit static pressure (Pa)
    pub exit_pressure_pa: f64,
    /// Exit static temperature (K)
    pub exit_temperature_k: f64,
    /// Throat static temperature (K)
    pub throat_temperature_k: f64,
    /// Sonic velocity at the throat (m/s)
    pub throat_velocity_m_s: f64,
    /// Ideal jet velocity at the exit pressure (m/s)
    pub exhaust_velocity_m_s: f64,
    /// Mass flow for the thrust target, sized on ve at ambient (kg/s)
    pub mass_flow_kg_s: f64,
    /// Characteristic velocity c* (m/s)
    pub characteristic_velocity_m_s: f64,
    /// Ideal thrust coefficient including the pressure term
    pub thrust_coefficient: f64,
    /// Pressure thrust (pe − pa)·Ae at the design point (N)
    pub pressure_thrust_n: f64,
    /// Ideal specific impulse including pressure thrust (s)
    pub specific_impulse_s: f64,

    /// Advisories (off-design expansion, contour fallback)
    pub warnings: Vec<Advisory>,
}

impl NozzleGeometry {
    /// Momentum plus pressure thrust at the design ambient pressure (N)
    pub fn delivered_thrust_n(&self) -> f64 {
        self.mass_flow_kg_s * self.exhaust_velocity_m_s + self.pressure_thrust_n
    }
}

/// Design a nozzle with the default engine configuration.
///
/// # Returns
///
/// * `Ok(NozzleGeometry)` - Geometry, contour and flow state
/// * `Err(CalcError)` - `InvalidNozzleSpec`/`InvalidChamberState` for bad input,
///   `SolverDidNotConverge` if the expansion ratio cannot be inverted
pub fn design(chamber: &ChamberState, spec: &NozzleSpec) -> CalcResult<NozzleGeometry> {
    design_with(chamber, spec, config::defaults())
}

/// Design a nozzle with an explicit engine configuration.
pub fn design_with(chamber: &ChamberState, spec: &NozzleSpec, config: &EngineConfig) -> CalcResult<NozzleGeometry> {
    spec.validate(chamber)?;

    let g = chamber.gamma;
    let pa = spec.ambient_pressure_pa;

    // 1. Exit Mach and exit static pressure
    let (exit_mach, exit_pressure_pa) = match spec.expansion_ratio {
        Some(eps) => {
            let me = mach_from_area_ratio(eps, g, FlowBranch::Supersonic, &config.solver)?;
            (me, chamber.p0_pa / pressure_ratio_from_mach(me, g))
        }
        None => (mach_from_pressure_ratio(chamber.p0_pa / pa, g)?, pa),
    };

    // 2. Exhaust velocity and mass flow from the thrust balance. Mass flow is
    //    sized on ve expanded to ambient, so an ε override only moves Ae. In
    //    vacuum there is no ambient design point and the exit state is used.
    let exhaust_velocity_m_s = exhaust_velocity(chamber, exit_pressure_pa)?;
    let sizing_velocity_m_s = if pa > 0.0 {
        exhaust_velocity(chamber, pa)?
    } else {
        exhaust_velocity_m_s
    };
    let mass_flow_kg_s = spec.thrust_target_n / sizing_velocity_m_s;

    // 3. Throat from choked flow
    let throat_area_m2 = mass_flow_kg_s / choked_mass_flux(chamber)?;
    let throat_radius_m = (throat_area_m2 / PI).sqrt();

    // 4. Exit from ε(Me)
    let expansion_ratio = area_ratio_from_mach(exit_mach, g);
    let exit_area_m2 = expansion_ratio * throat_area_m2;
    let exit_radius_m = (exit_area_m2 / PI).sqrt();

    // 5. Wall contour
    let mut warnings = expansion_advisories(exit_pressure_pa, pa);
    let contour = match spec.contour_type {
        ContourType::Conical => conical_contour(throat_radius_m, exit_radius_m, &config.nozzle),
        ContourType::Parabolic => parabolic_contour(throat_radius_m, exit_radius_m, expansion_ratio, &config.nozzle)
            .unwrap_or_else(|| {
                warnings.push(Advisory::ContourFallback {
                    requested: ContourType::Parabolic,
                    used: ContourType::Conical,
                    expansion_ratio,
                });
                conical_contour(throat_radius_m, exit_radius_m, &config.nozzle)
            }),
    };

    let throat = throat_conditions(chamber)?;
    let characteristic_velocity_m_s = characteristic_velocity(chamber)?;
    let thrust_coefficient = thrust_coefficient(g, exit_pressure_pa / chamber.p0_pa, pa / chamber.p0_pa, expansion_ratio);
    let pressure_thrust_n = (exit_pressure_pa - pa) * exit_area_m2;
    let delivered = mass_flow_kg_s * exhaust_velocity_m_s + pressure_thrust_n;
    let specific_impulse_s = delivered / (mass_flow_kg_s * config.performance.standard_gravity);

    for warning in &warnings {
        tracing::warn!(code = warning.code(), "{}", warning);
    }

    tracing::info!(
        contour = ?spec.contour_type,
        throat_radius_m,
        exit_radius_m,
        expansion_ratio,
        exit_mach,
        "nozzle designed"
    );

    Ok(NozzleGeometry {
        throat_radius_m,
        exit_radius_m,
        axial_length_m: contour.length_m,
        expansion_ratio,
        throat_area_m2,
        exit_area_m2,
        initial_wall_angle_deg: contour.initial_angle_deg,
        exit_wall_angle_deg: contour.exit_angle_deg,
        contour_points: contour.points,
        exit_mach,
        exit_pressure_pa,
        exit_temperature_k: chamber.t0_k / temperature_ratio_from_mach(exit_mach, g),
        throat_temperature_k: throat.temperature_k,
        throat_velocity_m_s: throat.velocity_m_s,
        exhaust_velocity_m_s,
        mass_flow_kg_s,
        characteristic_velocity_m_s,
        thrust_coefficient,
        pressure_thrust_n,
        specific_impulse_s,
        warnings,
    })
}

fn expansion_advisories(exit_pressure_pa: f64, ambient_pressure_pa: f64) -> Vec<Advisory> {
    let mismatch = (exit_pressure_pa - ambient_pressure_pa).abs() / ambient_pressure_pa.max(1.0);
    if mismatch <= 1e-6 {
        return Vec::new();
    }
    vec![Advisory::OffDesignExpansion {
        exit_pressure_pa,
        ambient_pressure_pa,
        separation_risk: exit_pressure_pa < SEPARATION_PRESSURE_RATIO * ambient_pressure_pa,
    }]
}

struct Contour {
    points: Vec<ContourPoint>,
    length_m: f64,
    initial_angle_deg: f64,
    exit_angle_deg: f64,
}

/// Straight wall from throat to exit at the cone half-angle.
fn conical_contour(rt: f64, re: f64, cfg: &NozzleConfig) -> Contour {
    let slope = cfg.cone_half_angle_deg.to_radians().tan();
    let length_m = (re - rt) / slope;

    let stations = linspace(0.0, length_m, cfg.contour_stations);
    let last = stations.len() - 1;
    let points = stations
        .iter()
        .enumerate()
        .map(|(i, &x)| ContourPoint::new(x, if i == last { re } else { rt + x * slope }))
        .collect();

    Contour {
        points,
        length_m,
        initial_angle_deg: cfg.cone_half_angle_deg,
        exit_angle_deg: cfg.cone_half_angle_deg,
    }
}

/// Bell wall: circular arc out of the throat to θn, then a quadratic Bézier
/// tangent to θn at the arc end and to θe at the exit lip.
///
/// Returns `None` when the exit lip does not lie beyond the end of the throat
/// arc (area ratios barely above 1), where no bell fits.
fn parabolic_contour(rt: f64, re: f64, expansion_ratio: f64, cfg: &NozzleConfig) -> Option<Contour> {
    let theta_n_deg = interpolate(&cfg.rao_angles, expansion_ratio, |r| r.area_ratio, |r| r.initial_angle_deg)?;
    let theta_e_deg = interpolate(&cfg.rao_angles, expansion_ratio, |r| r.area_ratio, |r| r.exit_angle_deg)?;
    let (theta_n, theta_e) = (theta_n_deg.to_radians(), theta_e_deg.to_radians());

    let cone_length = (re - rt) / cfg.cone_half_angle_deg.to_radians().tan();
    let length_m = cfg.bell_length_fraction * cone_length;

    // Throat arc, centred above the throat at (0, rt + ra)
    let ra = cfg.throat_arc_radius_ratio * rt;
    let mut points: Vec<ContourPoint> = linspace(-FRAC_PI_2, theta_n - FRAC_PI_2, cfg.throat_arc_stations)
        .into_iter()
        .map(|a| ContourPoint::new(ra * a.cos(), ra * a.sin() + rt + ra))
        .collect();
    // Pin the first station to the throat exactly
    points[0] = ContourPoint::new(0.0, rt);

    let n = *points.last()?;
    let (nx, ny) = (n.axial_position_m, n.radius_m);
    let (ex, ey) = (length_m, re);
    if ex <= nx || ey <= ny {
        return None;
    }

    // Control point at the tangent intersection, kept inside the N-E box so
    // the curve stays monotone in both axial position and radius
    let (m1, m2) = (theta_n.tan(), theta_e.tan());
    let qx = ((ey - ny + m1 * nx - m2 * ex) / (m1 - m2)).clamp(nx, ex);
    let qy = (m1 * (qx - nx) + ny).clamp(ny, ey);

    let bell = linspace(0.0, 1.0, cfg.contour_stations);
    let last = bell.len() - 1;
    points.extend(bell.iter().enumerate().skip(1).map(|(i, &t)| {
        if i == last {
            return ContourPoint::new(ex, ey);
        }
        let u = 1.0 - t;
        let x = u * u * nx + 2.0 * u * t * qx + t * t * ex;
        let y = u * u * ny + 2.0 * u * t * qy + t * t * ey;
        ContourPoint::new(x, y)
    }));

    Some(Contour {
        points,
        length_m,
        initial_angle_deg: theta_n_deg,
        exit_angle_deg: theta_e_deg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chamber() -> ChamberState {
        ChamberState {
            p0_pa: 6_106_000.0,
            t0_k: 1601.209,
            gamma: 1.136397,
            r_j_per_kg_k: 234.918,
        }
    }

    fn spec(contour_type: ContourType) -> NozzleSpec {
        NozzleSpec {
            thrust_target_n: 544.81,
            ambient_pressure_pa: 101_320.0,
            contour_type,
            expansion_ratio: None,
        }
    }

    fn assert_monotone(points: &[ContourPoint]) {
        for w in points.windows(2) {
            assert!(w[1].radius_m >= w[0].radius_m, "radius decreases: {:?}", w);
            assert!(w[1].axial_position_m >= w[0].axial_position_m, "x decreases: {:?}", w);
        }
    }

    #[test]
    fn test_conical_reference_design() {
        let geo = design(&chamber(), &spec(ContourType::Conical)).unwrap();
        // rt ≈ 4.19 mm, re ≈ 12.71 mm, ε ≈ 9.21
        assert!((geo.throat_radius_m * 1000.0 - 4.19).abs() < 0.02, "rt = {}", geo.throat_radius_m);
        assert!((geo.exit_radius_m * 1000.0 - 12.71).abs() < 0.05, "re = {}", geo.exit_radius_m);
        assert!((geo.expansion_ratio - 9.21).abs() < 0.01);
        assert_eq!(geo.contour_points.len(), 50);
        assert!(geo.warnings.is_empty());
    }

    #[test]
    fn test_conical_length_matches_half_angle() {
        let geo = design(&chamber(), &spec(ContourType::Conical)).unwrap();
        let expected = (geo.exit_radius_m - geo.throat_radius_m) / 15f64.to_radians().tan();
        assert!((geo.axial_length_m - expected).abs() < 1e-12);
        let last = geo.contour_points.last().unwrap();
        assert_eq!(last.radius_m, geo.exit_radius_m);
        assert!((last.axial_position_m - geo.axial_length_m).abs() < 1e-12);
    }

    #[test]
    fn test_parabolic_is_shorter_and_monotone() {
        let cone = design(&chamber(), &spec(ContourType::Conical)).unwrap();
        let bell = design(&chamber(), &spec(ContourType::Parabolic)).unwrap();

        assert!((bell.axial_length_m - 0.8 * cone.axial_length_m).abs() < 1e-12);
        assert_eq!(bell.contour_points[0].radius_m, bell.throat_radius_m);
        assert_eq!(bell.contour_points.last().unwrap().radius_m, bell.exit_radius_m);
        assert_eq!(bell.contour_points.len(), 10 + 49);
        assert_monotone(&bell.contour_points);
        // ε ≈ 9.2 sits between the 4 and 10 rows of the angle table
        assert!(bell.initial_wall_angle_deg > 21.5 && bell.initial_wall_angle_deg < 26.3);
        assert!(bell.exit_wall_angle_deg > 11.0 && bell.exit_wall_angle_deg < 14.0);
    }

    #[test]
    fn test_contour_area_column() {
        let geo = design(&chamber(), &spec(ContourType::Conical)).unwrap();
        let first = geo.contour_points[0];
        assert!((first.area_m2 - geo.throat_area_m2).abs() / geo.throat_area_m2 < 1e-9);
    }

    #[test]
    fn test_optimum_expansion_has_no_pressure_thrust() {
        let geo = design(&chamber(), &spec(ContourType::Conical)).unwrap();
        assert!(geo.pressure_thrust_n.abs() < 1e-6);
        assert!((geo.delivered_thrust_n() - 544.81).abs() < 1e-9);
        assert!((geo.exit_pressure_pa - 101_320.0).abs() < 1e-6);
    }

    #[test]
    fn test_expansion_ratio_override() {
        let mut s = spec(ContourType::Conical);
        s.expansion_ratio = Some(4.0);
        let geo = design(&chamber(), &s).unwrap();
        assert!((geo.expansion_ratio - 4.0).abs() < 1e-6);
        // Under-expanded at sea level: exit pressure above ambient
        assert!(geo.exit_pressure_pa > 101_320.0);
        assert!(geo.pressure_thrust_n > 0.0);
        assert!(matches!(
            geo.warnings.as_slice(),
            [Advisory::OffDesignExpansion { separation_risk: false, .. }]
        ));
    }

    #[test]
    fn test_expansion_ratio_override_keeps_throat() {
        let optimum = design(&chamber(), &spec(ContourType::Conical)).unwrap();
        let mut s = spec(ContourType::Conical);
        s.expansion_ratio = Some(4.0);
        let geo = design(&chamber(), &s).unwrap();

        // Throat is sized at the ambient design point; ε only moves the exit
        assert!((geo.throat_radius_m - optimum.throat_radius_m).abs() < 1e-15);
        assert!((geo.throat_radius_m * 1000.0 - 4.1896).abs() < 0.01, "rt = {}", geo.throat_radius_m);
        assert!((geo.mass_flow_kg_s - optimum.mass_flow_kg_s).abs() < 1e-15);
        assert!((geo.exit_area_m2 / geo.throat_area_m2 - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_subcritical_chamber_pressure_rejected() {
        // p0/pa ≈ 1.48, below the critical ratio ≈ 1.73: the throat cannot choke
        let mut c = chamber();
        c.p0_pa = 150_000.0;
        let err = design(&c, &spec(ContourType::Conical)).unwrap_err();
        match err {
            CalcError::InvalidNozzleSpec { ref field, .. } => assert_eq!(field, "p0_pa"),
            ref other => panic!("expected InvalidNozzleSpec, got {:?}", other),
        }

        // Just above the critical ratio the design goes through supersonic
        let critical = pressure_ratio_from_mach(1.0, c.gamma);
        assert!((critical - 1.7326).abs() < 1e-3, "critical = {}", critical);
        c.p0_pa = 1.05 * critical * 101_320.0;
        let geo = design(&c, &spec(ContourType::Conical)).unwrap();
        assert!(geo.exit_mach > 1.0);
    }

    #[test]
    fn test_parabolic_falls_back_with_advisory() {
        let mut s = spec(ContourType::Parabolic);
        s.expansion_ratio = Some(1.01);
        let geo = design(&chamber(), &s).unwrap();

        let cone = (geo.exit_radius_m - geo.throat_radius_m) / 15f64.to_radians().tan();
        assert!((geo.axial_length_m - cone).abs() < 1e-12);
        assert_eq!(geo.contour_points.len(), 50);
        assert!(geo.warnings.iter().any(|w| matches!(
            w,
            Advisory::ContourFallback {
                requested: ContourType::Parabolic,
                used: ContourType::Conical,
                ..
            }
        )));
    }

    #[test]
    fn test_vacuum_needs_override() {
        let mut s = spec(ContourType::Conical);
        s.ambient_pressure_pa = 0.0;
        let err = design(&chamber(), &s).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_NOZZLE_SPEC");

        s.expansion_ratio = Some(40.0);
        let geo = design(&chamber(), &s).unwrap();
        assert!(geo.exit_mach > 3.0);
    }

    #[test]
    fn test_invalid_requests() {
        let mut s = spec(ContourType::Conical);
        s.thrust_target_n = 0.0;
        assert_eq!(design(&chamber(), &s).unwrap_err().error_code(), "INVALID_NOZZLE_SPEC");

        let mut c = chamber();
        c.p0_pa = 90_000.0;
        assert_eq!(design(&c, &spec(ContourType::Conical)).unwrap_err().error_code(), "INVALID_NOZZLE_SPEC");

        let mut c = chamber();
        c.gamma = 0.9;
        assert_eq!(design(&c, &spec(ContourType::Conical)).unwrap_err().error_code(), "INVALID_NOZZLE_SPEC");

        let mut c = chamber();
        c.t0_k = -10.0;
        assert_eq!(design(&c, &spec(ContourType::Conical)).unwrap_err().error_code(), "INVALID_CHAMBER_STATE");

        let mut s = spec(ContourType::Conical);
        s.expansion_ratio = Some(1.0);
        assert_eq!(design(&chamber(), &s).unwrap_err().error_code(), "INVALID_NOZZLE_SPEC");
    }

    #[test]
    fn test_solver_failure_propagates() {
        let mut config = EngineConfig::default();
        config.solver.tolerance = 1e-16;
        config.solver.max_iterations = 5;
        let mut s = spec(ContourType::Conical);
        s.expansion_ratio = Some(8.0);
        let err = design_with(&chamber(), &s, &config).unwrap_err();
        assert_eq!(err.error_code(), "SOLVER_DID_NOT_CONVERGE");
    }

    #[test]
    fn test_thrust_scales_throat_area() {
        let small = design(&chamber(), &spec(ContourType::Conical)).unwrap();
        let mut s = spec(ContourType::Conical);
        s.thrust_target_n *= 2.0;
        let large = design(&chamber(), &s).unwrap();
        assert!((large.throat_area_m2 / small.throat_area_m2 - 2.0).abs() < 1e-9);
        assert!((large.expansion_ratio - small.expansion_ratio).abs() < 1e-12);
    }

    #[test]
    fn test_serialization() {
        let s = spec(ContourType::Parabolic);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"parabolic\""));
        let roundtrip: NozzleSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(s, roundtrip);

        // Omitted override deserializes as unset, not zero
        let parsed: NozzleSpec =
            serde_json::from_str(r#"{"thrust_target_n": 100.0, "ambient_pressure_pa": 101325.0}"#).unwrap();
        assert_eq!(parsed.expansion_ratio, None);
        assert_eq!(parsed.contour_type, ContourType::Conical);
    }
}
