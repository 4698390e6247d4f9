//! # Pressure Vessel Formulas
//!
//! Closed-form stress relations for a motor case (closed-end cylinder under
//! internal pressure), its flat bulkhead, and the radial bolts that retain
//! the bulkhead.
//!
//! ## Notation
//!
//! - `p` = Internal pressure
//! - `di` = Inner diameter, `ri` = inner radius, `ro` = outer radius
//! - `e` = Wall thickness
//! - `σt`, `σl`, `σr` = Hoop (tangential), longitudinal and radial stress
//! - `t` = Bulkhead plate thickness
//!
//! ## Sign Conventions
//!
//! - Tension positive, compression negative
//!
//! ## References
//!
//! - Roark's Formulas for Stress and Strain, 8th Edition, Table 13.5 (vessels)
//!   and Table 11.2 (circular plates)
//! - Shigley's Mechanical Engineering Design, 10th Edition, Section 3-14

use std::f64::consts::PI;

// =============================================================================
// CYLINDER STRESSES
// =============================================================================

/// Thin-wall hoop stress σt = p·di/(2e)
#[inline]
pub fn thin_wall_hoop_stress(p: f64, di: f64, e: f64) -> f64 {
    p * di / (2.0 * e)
}

/// Thin-wall longitudinal stress for closed ends σl = p·di/(4e)
#[inline]
pub fn thin_wall_longitudinal_stress(p: f64, di: f64, e: f64) -> f64 {
    p * di / (4.0 * e)
}

/// Lamé stresses at the inner surface of a thick closed-end cylinder.
///
/// # Formulas (Roark's Table 13.5, Case 1c)
/// - σt = p(ro² + ri²)/(ro² − ri²)
/// - σl = p·ri²/(ro² − ri²)
/// - σr = −p
///
/// # Returns
/// (σt, σl, σr)
pub fn lame_inner_surface_stresses(p: f64, ri: f64, ro: f64) -> (f64, f64, f64) {
    let (ri2, ro2) = (ri * ri, ro * ro);
    let hoop = p * (ro2 + ri2) / (ro2 - ri2);
    let longitudinal = p * ri2 / (ro2 - ri2);
    (hoop, longitudinal, -p)
}

/// Von Mises equivalent stress from three principal stresses.
///
/// ```text
/// σ_VM = √[ ((σ1−σ2)² + (σ2−σ3)² + (σ3−σ1)²) / 2 ]
/// ```
///
/// # Example
/// ```rust
/// use motor_core::equations::pressure_vessel::von_mises_stress;
///
/// // Uniaxial tension reduces to the applied stress
/// assert!((von_mises_stress(250.0e6, 0.0, 0.0) - 250.0e6).abs() < 1e-3);
/// ```
#[inline]
pub fn von_mises_stress(s1: f64, s2: f64, s3: f64) -> f64 {
    (((s1 - s2).powi(2) + (s2 - s3).powi(2) + (s3 - s1).powi(2)) / 2.0).sqrt()
}

// =============================================================================
// BULKHEAD PLATE
// =============================================================================

/// Peak-stress coefficient k in σmax = k·p·r²/t² for a clamped circular plate.
///
/// Roark's Table 11.2, Case 10b: σ = 3pr²/(4t²) at the edge.
pub const CLAMPED_PLATE_COEFFICIENT: f64 = 0.75;

/// Peak-stress coefficient for a simply-supported circular plate.
///
/// Roark's Table 11.2, Case 10a: σ = 3(3+ν)pr²/(8t²) at the centre.
#[inline]
pub fn simply_supported_plate_coefficient(poisson_ratio: f64) -> f64 {
    3.0 * (3.0 + poisson_ratio) / 8.0
}

/// Plate thickness for a target factor of safety.
///
/// Inverts σmax = k·p·r²/t² with σmax = yield/FS:
/// ```text
/// t = r·√(k·p·FS / σy)
/// ```
#[inline]
pub fn plate_thickness(coefficient: f64, p: f64, radius: f64, design_factor: f64, yield_stress: f64) -> f64 {
    radius * (coefficient * p * design_factor / yield_stress).sqrt()
}

// =============================================================================
// FASTENERS
// =============================================================================

/// Separating force on a closure of inner diameter `di`: F = p·π·(di/2)²
#[inline]
pub fn closure_force(p: f64, di: f64) -> f64 {
    p * PI * (di / 2.0).powi(2)
}

/// Shear yield strength by the distortion-energy criterion τy = σy/√3
#[inline]
pub fn shear_yield(yield_stress: f64) -> f64 {
    yield_stress / 3f64.sqrt()
}

/// Cross-sectional area of a circular bolt shank
#[inline]
pub fn circle_area(diameter: f64) -> f64 {
    PI * (diameter / 2.0).powi(2)
}

/// Unrounded number of bolts carrying `force` in single shear.
///
/// ```text
/// N = F·FS / (A_bolt·τy)
/// ```
#[inline]
pub fn required_bolts(force: f64, design_factor: f64, bolt_area: f64, shear_yield: f64) -> f64 {
    force * design_factor / (bolt_area * shear_yield)
}
