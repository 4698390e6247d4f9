//! # Unit Types
//!
//! Newtype wrappers for the units that cross the engine boundary. The
//! calculators work in SI only (m, Pa, K, kg, N). The student-facing forms
//! speak millimetres, centimetres, megapascals and percent, and those
//! conversions happen here, before a request reaches a calculator.
//!
//! ## Example
//!
//! ```rust
//! use motor_core::units::{Meters, Millimeters, MegaPascals, Pascals};
//!
//! let wall: Meters = Millimeters(3.175).into();
//! assert!((wall.0 - 0.003175).abs() < 1e-12);
//!
//! let p: Pascals = MegaPascals(7.0).into();
//! assert_eq!(p.0, 7.0e6);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Length Units
// ============================================================================

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in centimetres (rocket diameter in the drag influence number)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

impl From<Centimeters> for Meters {
    fn from(cm: Centimeters) -> Self {
        Meters(cm.0 / 100.0)
    }
}

impl From<Meters> for Centimeters {
    fn from(m: Meters) -> Self {
        Centimeters(m.0 * 100.0)
    }
}

// ============================================================================
// Pressure / Stress Units
// ============================================================================

/// Pressure or stress in pascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pascals(pub f64);

/// Pressure or stress in megapascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MegaPascals(pub f64);

impl From<MegaPascals> for Pascals {
    fn from(mpa: MegaPascals) -> Self {
        Pascals(mpa.0 * 1.0e6)
    }
}

impl From<Pascals> for MegaPascals {
    fn from(pa: Pascals) -> Self {
        MegaPascals(pa.0 / 1.0e6)
    }
}

// ============================================================================
// Ratios
// ============================================================================

/// A ratio expressed in percent (14.0 = 14 %)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(pub f64);

impl Percent {
    /// The ratio as a plain fraction (14 % → 0.14)
    pub fn fraction(self) -> f64 {
        self.0 / 100.0
    }
}

// ============================================================================
// Raw Values
// ============================================================================

macro_rules! impl_value {
    ($type:ty) => {
        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_value!(Meters);
impl_value!(Millimeters);
impl_value!(Centimeters);
impl_value!(Pascals);
impl_value!(MegaPascals);
