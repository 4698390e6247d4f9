//! # Performance Sizing
//!
//! Back-solves the total impulse a motor must deliver to lift a vehicle to a
//! target apogee, correcting for aerodynamic drag with the Drag Influence
//! Number method (R. Nakka).
//!
//! ## Method
//!
//! Drag losses depend on burnout velocity, which depends on the impulse being
//! solved for, so the solve is a bounded goal-seek:
//!
//! 1. Start drag-free (fz = 1).
//! 2. The drag-free apogee that drag reduces to the target is z₂ = z/fz.
//!    With constant thrust over the burn, the net boost acceleration that
//!    reaches z₂ is `a = (g/2)·(√(1 + 8z₂/(g·t²)) − 1)`.
//! 3. Thrust F = m̄·(a + g) on the average flight mass m̄ = me + mp/2;
//!    impulse I = F·t; drag-free burnout velocity v₁ = a·t.
//! 4. Drag Influence Number `N = Cd·D²·v₁² / (1000·me)` with D in cm.
//! 5. Interpolate fz, fzbo, fv, ft from the correlation table and repeat
//!    until I changes by less than the relative tolerance.
//!
//! A result is only returned from a converged iteration; hitting the
//! iteration cap is [`CalcError::SolverDidNotConverge`].
//!
//! ## Mass Fraction Convention
//!
//! `propellant_mass_fraction` is read against
//! [`MassFractionBasis::EmptyMass`] by default (mp = me·f, "mass of
//! propellant / mass empty"). [`MassFractionBasis::LiftoffMass`] reads it as
//! mp/(me+mp) instead, giving mp = me·f/(1−f).
//!
//! ## Example
//!
//! ```rust
//! use motor_core::calculations::performance::{solve, PerformanceSpec};
//!
//! let spec = PerformanceSpec::from_presentation_units(500.0, 1.0, 2.5, 14.0, 5.0, 0.45);
//! let result = solve(&spec).unwrap();
//!
//! println!("Impulse: {:.1} N·s ({})", result.total_impulse_ns, result.motor_class);
//! assert!(result.drag_factors.altitude <= 1.0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calculations::Advisory;
use crate::config::{self, DragFactorRow, EngineConfig, PerformanceConfig};
use crate::equations::numeric::interpolate;
use crate::errors::{CalcError, CalcResult};
use crate::units::{Centimeters, Meters, Percent};

/// What `propellant_mass_fraction` is a fraction of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassFractionBasis {
    /// f = mp / me
    #[default]
    EmptyMass,
    /// f = mp / (me + mp)
    LiftoffMass,
}

/// Vehicle and mission inputs (SI).
///
/// ## JSON Example
///
/// ```json
/// {
///   "target_apogee_m": 500.0,
///   "burn_time_s": 1.0,
///   "empty_mass_kg": 2.5,
///   "propellant_mass_fraction": 0.14,
///   "diameter_m": 0.05,
///   "drag_coefficient": 0.45
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSpec {
    /// Target apogee above the launch site (m)
    pub target_apogee_m: f64,

    /// Motor burn time (s)
    pub burn_time_s: f64,

    /// Vehicle mass without propellant (kg)
    pub empty_mass_kg: f64,

    /// Propellant mass fraction, 0 < f < 1
    pub propellant_mass_fraction: f64,

    /// Vehicle body diameter (m)
    pub diameter_m: f64,

    /// Drag coefficient Cd
    pub drag_coefficient: f64,

    /// Reference mass for `propellant_mass_fraction`
    #[serde(default)]
    pub mass_fraction_basis: MassFractionBasis,
}

impl PerformanceSpec {
    /// Build a spec from the form units: body diameter in cm, mass fraction
    /// in percent.
    pub fn from_presentation_units(
        target_apogee_m: f64,
        burn_time_s: f64,
        empty_mass_kg: f64,
        mass_fraction_percent: f64,
        diameter_cm: f64,
        drag_coefficient: f64,
    ) -> Self {
        PerformanceSpec {
            target_apogee_m,
            burn_time_s,
            empty_mass_kg,
            propellant_mass_fraction: Percent(mass_fraction_percent).fraction(),
            diameter_m: Meters::from(Centimeters(diameter_cm)).value(),
            drag_coefficient,
            mass_fraction_basis: MassFractionBasis::EmptyMass,
        }
    }

    /// Propellant mass under the selected basis (kg)
    pub fn propellant_mass_kg(&self) -> f64 {
        let (me, f) = (self.empty_mass_kg, self.propellant_mass_fraction);
        match self.mass_fraction_basis {
            MassFractionBasis::EmptyMass => me * f,
            MassFractionBasis::LiftoffMass => me * f / (1.0 - f),
        }
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        let positive = [
            ("target_apogee_m", self.target_apogee_m),
            ("burn_time_s", self.burn_time_s),
            ("empty_mass_kg", self.empty_mass_kg),
            ("diameter_m", self.diameter_m),
        ];
        for (field, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }

        let f = self.propellant_mass_fraction;
        if !(f > 0.0 && f < 1.0) {
            return Err(CalcError::invalid_input(
                "propellant_mass_fraction",
                f.to_string(),
                "Must be between 0 and 1 (exclusive)",
            ));
        }

        let cd = self.drag_coefficient;
        if !(cd >= 0.0) || !cd.is_finite() {
            return Err(CalcError::invalid_input("drag_coefficient", cd.to_string(), "Cannot be negative"));
        }
        Ok(())
    }
}

/// Drag reduction factors, each in (0, 1]; 1 means no loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragFactors {
    /// Peak altitude factor fz
    pub altitude: f64,
    /// Burnout altitude factor fzbo
    pub burnout_altitude: f64,
    /// Burnout velocity factor fv
    pub velocity: f64,
    /// Time to apogee factor ft
    pub time: f64,
}

impl DragFactors {
    /// Vacuum: no drag loss
    pub const NONE: DragFactors = DragFactors {
        altitude: 1.0,
        burnout_altitude: 1.0,
        velocity: 1.0,
        time: 1.0,
    };

    /// Interpolate the correlation at drag influence number `n`.
    fn lookup(table: &[DragFactorRow], n: f64) -> CalcResult<Self> {
        let column = |value: fn(&DragFactorRow) -> f64| {
            interpolate(table, n, |r| r.n, value)
                .ok_or_else(|| CalcError::config("performance.drag_table must not be empty"))
        };
        Ok(DragFactors {
            altitude: column(|r| r.altitude)?,
            burnout_altitude: column(|r| r.burnout_altitude)?,
            velocity: column(|r| r.velocity)?,
            time: column(|r| r.time)?,
        })
    }
}

/// Certification class of a total impulse.
///
/// Each letter doubles the upper bound of the previous one (A: 1.25-2.5 N·s,
/// B: 2.5-5 N·s, ...). Below class A the fractional classes 1/2A, 1/4A and
/// 1/8A apply.
///
/// Intervals are open below and closed above, as on certification tables:
/// exactly 2.5 N·s is an A, exactly 1.25 N·s is a 1/2A, and anything above
/// 2.5 N·s is a B.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorClass {
    /// Class code, e.g. "H" or "1/2A"
    pub letter: String,
    /// Position of the impulse within the class span (0-100)
    pub percent: f64,
    /// Lower impulse bound of the class (N·s)
    pub lower_impulse_ns: f64,
    /// Upper impulse bound of the class (N·s)
    pub upper_impulse_ns: f64,
}

impl MotorClass {
    /// Classify a total impulse against a class A upper bound.
    pub fn classify(total_impulse_ns: f64, class_a_upper: f64) -> Self {
        // Index 0 is class A; negative indices are the fractional classes
        let index = (total_impulse_ns / class_a_upper).log2().ceil().max(-3.0) as i32;
        let upper = class_a_upper * 2f64.powi(index);
        let lower = upper / 2.0;

        let letter = match index {
            i if i < 0 => format!("1/{}A", 1 << (-i)),
            i if i < 26 => char::from(b'A' + i as u8).to_string(),
            i => format!("Z+{}", i - 25),
        };
        let percent = ((total_impulse_ns - lower) / (upper - lower) * 100.0).clamp(0.0, 100.0);

        MotorClass {
            letter,
            percent,
            lower_impulse_ns: lower,
            upper_impulse_ns: upper,
        }
    }
}

impl fmt::Display for MotorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.0}%", self.letter, self.percent)
    }
}

/// Results from performance sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceResult {
    // === Motor requirement ===
    /// Required total impulse (N·s)
    pub total_impulse_ns: f64,
    /// Average thrust over the burn (N)
    pub average_thrust_n: f64,
    /// Required specific impulse (s)
    pub specific_impulse_s: f64,
    /// Propellant mass (kg)
    pub propellant_mass_kg: f64,
    /// Motor class
    pub motor_class: MotorClass,

    // === Flight ===
    /// Average flight mass me + mp/2 (kg)
    pub average_mass_kg: f64,
    /// Burnout velocity with drag (m/s)
    pub burnout_velocity_m_s: f64,
    /// Burnout Mach at the sea-level speed of sound
    pub burnout_mach: f64,
    /// Burnout altitude with drag (m)
    pub burnout_altitude_m: f64,
    /// Predicted apogee with drag (m)
    pub peak_altitude_m: f64,
    /// Time from ignition to apogee (s)
    pub time_to_apogee_s: f64,
    /// Peak net acceleration, at burnout (g)
    pub max_acceleration_g: f64,

    // === Drag correlation ===
    /// Drag Influence Number at convergence
    pub drag_influence_number: f64,
    /// Reduction factors at convergence
    pub drag_factors: DragFactors,
    /// Goal-seek iterations used
    pub iterations: u32,

    /// Advisories
    pub warnings: Vec<Advisory>,
}

/// Drag-free boost/coast state for one goal-seek pass.
struct Trajectory {
    thrust_n: f64,
    total_impulse_ns: f64,
    burnout_velocity_m_s: f64,
    burnout_altitude_m: f64,
    coast_time_s: f64,
    apogee_m: f64,
}

impl Trajectory {
    /// Constant-thrust boost that coasts to `apogee` without drag.
    fn reaching(apogee: f64, spec: &PerformanceSpec, average_mass: f64, g: f64) -> Self {
        let t = spec.burn_time_s;
        let acceleration = g / 2.0 * ((1.0 + 8.0 * apogee / (g * t * t)).sqrt() - 1.0);
        let thrust = average_mass * (acceleration + g);
        let velocity = acceleration * t;
        Trajectory {
            thrust_n: thrust,
            total_impulse_ns: thrust * t,
            burnout_velocity_m_s: velocity,
            burnout_altitude_m: 0.5 * acceleration * t * t,
            coast_time_s: velocity / g,
            apogee_m: apogee,
        }
    }
}

/// Drag Influence Number N = Cd·D²·V²/(1000·m), D in cm.
#[inline]
pub fn drag_influence_number(drag_coefficient: f64, diameter_m: f64, velocity_m_s: f64, mass_kg: f64) -> f64 {
    let diameter_cm = Centimeters::from(Meters(diameter_m)).value();
    drag_coefficient * diameter_cm.powi(2) * velocity_m_s.powi(2) / (1000.0 * mass_kg)
}

/// Solve for required impulse with the default configuration.
pub fn solve(spec: &PerformanceSpec) -> CalcResult<PerformanceResult> {
    solve_with(spec, config::defaults())
}

/// Solve for required impulse with an explicit configuration.
pub fn solve_with(spec: &PerformanceSpec, config: &EngineConfig) -> CalcResult<PerformanceResult> {
    spec.validate()?;
    let cfg = &config.performance;
    let g = cfg.standard_gravity;

    let propellant_mass = spec.propellant_mass_kg();
    let average_mass = spec.empty_mass_kg + propellant_mass / 2.0;

    let mut factors = DragFactors::NONE;
    let mut previous_impulse: Option<f64> = None;
    let mut last_change = f64::INFINITY;

    for iteration in 1..=cfg.max_iterations {
        let trajectory = Trajectory::reaching(spec.target_apogee_m / factors.altitude, spec, average_mass, g);
        let n = drag_influence_number(
            spec.drag_coefficient,
            spec.diameter_m,
            trajectory.burnout_velocity_m_s,
            spec.empty_mass_kg,
        );
        factors = DragFactors::lookup(&cfg.drag_table, n)?;

        let impulse = trajectory.total_impulse_ns;
        let change = previous_impulse.map(|prev| (impulse - prev).abs() / impulse);
        tracing::debug!(iteration, impulse, n, fz = factors.altitude, "performance goal-seek");

        if let Some(change) = change {
            if change < cfg.impulse_tolerance {
                return Ok(finish(spec, cfg, trajectory, n, factors, propellant_mass, average_mass, iteration));
            }
            last_change = change;
        }
        previous_impulse = Some(impulse);
    }

    Err(CalcError::did_not_converge(
        "performance_goal_seek",
        cfg.max_iterations,
        last_change,
        cfg.impulse_tolerance,
    ))
}

#[allow(clippy::too_many_arguments)]
fn finish(
    spec: &PerformanceSpec,
    cfg: &PerformanceConfig,
    trajectory: Trajectory,
    n: f64,
    factors: DragFactors,
    propellant_mass: f64,
    average_mass: f64,
    iterations: u32,
) -> PerformanceResult {
    let g = cfg.standard_gravity;
    let total_impulse = trajectory.total_impulse_ns;
    let burnout_velocity = factors.velocity * trajectory.burnout_velocity_m_s;
    let specific_impulse = total_impulse / (propellant_mass * g);
    // Lightest at burnout
    let max_acceleration_g = (trajectory.thrust_n / spec.empty_mass_kg - g) / g;

    let mut warnings = Vec::new();
    if n > cfg.calibrated_n_max() {
        warnings.push(Advisory::DragCorrelationExtrapolated {
            drag_influence_number: n,
            calibrated_max: cfg.calibrated_n_max(),
        });
    }
    let f = spec.propellant_mass_fraction;
    if f < cfg.min_mass_fraction || f > cfg.max_mass_fraction {
        warnings.push(Advisory::UnusualMassFraction {
            mass_fraction: f,
            min: cfg.min_mass_fraction,
            max: cfg.max_mass_fraction,
        });
    }
    if max_acceleration_g > cfg.max_acceleration_g {
        warnings.push(Advisory::HighAcceleration {
            acceleration_g: max_acceleration_g,
            limit_g: cfg.max_acceleration_g,
        });
    }
    if specific_impulse > cfg.max_specific_impulse_s {
        warnings.push(Advisory::HighSpecificImpulse {
            specific_impulse_s: specific_impulse,
            limit_s: cfg.max_specific_impulse_s,
        });
    }
    for warning in &warnings {
        tracing::warn!(code = warning.code(), "{}", warning);
    }

    let motor_class = MotorClass::classify(total_impulse, cfg.class_a_upper_impulse);
    tracing::info!(
        total_impulse,
        motor_class = %motor_class,
        iterations,
        "performance solved"
    );

    PerformanceResult {
        total_impulse_ns: total_impulse,
        average_thrust_n: total_impulse / spec.burn_time_s,
        specific_impulse_s: specific_impulse,
        propellant_mass_kg: propellant_mass,
        motor_class,
        average_mass_kg: average_mass,
        burnout_velocity_m_s: burnout_velocity,
        burnout_mach: burnout_velocity / cfg.sea_level_sound_speed,
        burnout_altitude_m: factors.burnout_altitude * trajectory.burnout_altitude_m,
        peak_altitude_m: factors.altitude * trajectory.apogee_m,
        time_to_apogee_s: factors.time * (spec.burn_time_s + trajectory.coast_time_s),
        max_acceleration_g,
        drag_influence_number: n,
        drag_factors: factors,
        iterations,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_spec() -> PerformanceSpec {
        PerformanceSpec::from_presentation_units(500.0, 1.0, 2.5, 14.0, 5.0, 0.45)
    }

    #[test]
    fn test_reference_scenario() {
        let result = solve(&reference_spec()).unwrap();
        // mp = 2.5 · 0.14; converges near N ≈ 43.6, fz ≈ 0.922
        assert!((result.propellant_mass_kg - 0.35).abs() < 1e-12);
        assert!((result.average_mass_kg - 2.675).abs() < 1e-12);
        assert!((result.total_impulse_ns - 289.42).abs() < 0.1, "I = {}", result.total_impulse_ns);
        assert!((result.drag_influence_number - 43.56).abs() < 0.05);
        assert!((result.drag_factors.altitude - 0.9216).abs() < 1e-3);
        assert_eq!(result.iterations, 5);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_drag_factors_bounded() {
        let result = solve(&reference_spec()).unwrap();
        let f = result.drag_factors;
        for value in [f.altitude, f.burnout_altitude, f.velocity, f.time] {
            assert!(value > 0.0 && value <= 1.0);
        }
    }

    #[test]
    fn test_derived_quantities() {
        let result = solve(&reference_spec()).unwrap();
        assert!((result.average_thrust_n - result.total_impulse_ns / 1.0).abs() < 1e-9);
        let isp = result.total_impulse_ns / (0.35 * 9.81);
        assert!((result.specific_impulse_s - isp).abs() < 1e-9);
        assert!((result.burnout_mach - result.burnout_velocity_m_s / 340.0).abs() < 1e-12);
        // Predicted apogee lands on the target within the impulse tolerance
        assert!((result.peak_altitude_m - 500.0).abs() / 500.0 < 1e-3);
        assert!(result.burnout_altitude_m < result.peak_altitude_m);
        assert!(result.time_to_apogee_s > 1.0);
    }

    #[test]
    fn test_motor_class_of_reference() {
        let result = solve(&reference_spec()).unwrap();
        // 160-320 N·s is class H
        assert_eq!(result.motor_class.letter, "H");
        assert_eq!(result.motor_class.lower_impulse_ns, 160.0);
        assert_eq!(result.motor_class.upper_impulse_ns, 320.0);
        assert!((result.motor_class.percent - 80.9).abs() < 0.2);
    }

    #[test]
    fn test_motor_class_boundaries() {
        assert_eq!(MotorClass::classify(2.0, 2.5).letter, "A");
        assert_eq!(MotorClass::classify(2.5, 2.5).letter, "A");
        assert_eq!(MotorClass::classify(2.6, 2.5).letter, "B");
        assert_eq!(MotorClass::classify(7.5, 2.5).letter, "C");
        assert_eq!(MotorClass::classify(1.0, 2.5).letter, "1/2A");
        assert_eq!(MotorClass::classify(0.5, 2.5).letter, "1/4A");
        assert_eq!(MotorClass::classify(0.1, 2.5).letter, "1/8A");
        assert_eq!(MotorClass::classify(7.5, 2.5).to_string(), "C 50%");
    }

    #[test]
    fn test_motor_class_upper_bound_is_inclusive() {
        let half_a = MotorClass::classify(1.25, 2.5);
        assert_eq!(half_a.letter, "1/2A");
        assert_eq!(half_a.upper_impulse_ns, 1.25);
        assert_eq!(half_a.percent, 100.0);
        assert_eq!(MotorClass::classify(1.2501, 2.5).letter, "A");
        assert_eq!(MotorClass::classify(5.0, 2.5).letter, "B");
        assert_eq!(MotorClass::classify(160.0, 2.5).letter, "G");
        assert_eq!(MotorClass::classify(160.01, 2.5).letter, "H");
    }

    #[test]
    fn test_no_drag_is_ballistic() {
        let mut spec = reference_spec();
        spec.drag_coefficient = 0.0;
        let result = solve(&spec).unwrap();
        assert_eq!(result.drag_factors, DragFactors::NONE);
        assert_eq!(result.iterations, 2);
        // a = (g/2)(√(1 + 8·500/g) − 1)
        let g: f64 = 9.81;
        let a = g / 2.0 * ((1.0 + 8.0 * 500.0 / g).sqrt() - 1.0);
        assert!((result.total_impulse_ns - 2.675 * (a + g)).abs() < 1e-9);
    }

    #[test]
    fn test_liftoff_basis_needs_more_propellant() {
        let mut spec = reference_spec();
        spec.mass_fraction_basis = MassFractionBasis::LiftoffMass;
        let liftoff = solve(&spec).unwrap();
        let empty = solve(&reference_spec()).unwrap();
        assert!((liftoff.propellant_mass_kg - 2.5 * 0.14 / 0.86).abs() < 1e-12);
        assert!(liftoff.total_impulse_ns > empty.total_impulse_ns);
    }

    #[test]
    fn test_idempotent() {
        let spec = reference_spec();
        assert_eq!(solve(&spec).unwrap(), solve(&spec).unwrap());
    }

    #[test]
    fn test_advisories() {
        // Heavy drag, short burn, tiny propellant load
        let spec = PerformanceSpec::from_presentation_units(3000.0, 0.3, 5.0, 2.0, 10.0, 0.5);
        let result = solve(&spec).unwrap();
        let codes: Vec<_> = result.warnings.iter().map(|w| w.code()).collect();
        assert!(codes.contains(&"drag_correlation_extrapolated"));
        assert!(codes.contains(&"unusual_mass_fraction"));
        assert!(codes.contains(&"high_acceleration"));
        assert!(codes.contains(&"high_specific_impulse"));
    }

    #[test]
    fn test_iteration_cap_is_error() {
        let mut config = EngineConfig::default();
        config.performance.max_iterations = 3;
        let err = solve_with(&reference_spec(), &config).unwrap_err();
        assert_eq!(err.error_code(), "SOLVER_DID_NOT_CONVERGE");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_invalid_inputs() {
        let mut spec = reference_spec();
        spec.propellant_mass_fraction = 1.0;
        assert_eq!(solve(&spec).unwrap_err().error_code(), "INVALID_INPUT");

        let mut spec = reference_spec();
        spec.burn_time_s = 0.0;
        assert_eq!(solve(&spec).unwrap_err().error_code(), "INVALID_INPUT");

        let mut spec = reference_spec();
        spec.drag_coefficient = -0.1;
        assert_eq!(solve(&spec).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_drag_influence_number_units() {
        // 5 cm, 100 m/s, Cd 0.45, 2.5 kg → 0.45·25·10000/2500 = 45
        assert!((drag_influence_number(0.45, 0.05, 100.0, 2.5) - 45.0).abs() < 1e-9);
    }
}
