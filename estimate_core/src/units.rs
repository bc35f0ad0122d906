//! # Unit Types
//!
//! Type-safe wrappers for the units the estimator reconciles. Catalog unit
//! dimensions arrive in inches, room geometry in feet, mortar is derived in
//! cubic feet and ordered in cubic meters and kilograms.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::units::{CuFt, CubicMeters, Feet, Inches};
//!
//! let joint = Inches(0.375);
//! let joint_ft: Feet = joint.into();
//! assert!((joint_ft.0 - 0.03125).abs() < 1e-12);
//!
//! let wall = CuFt(35.3147);
//! let wall_m3: CubicMeters = wall.into();
//! assert!((wall_m3.0 - 1.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Inches per foot
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Cubic inches per cubic foot
pub const CUBIC_INCHES_PER_CUBIC_FOOT: f64 = 1728.0;

/// Cubic feet per cubic meter
pub const CUBIC_FEET_PER_CUBIC_METER: f64 = 35.3147;

// ============================================================================
// Length Units
// ============================================================================

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Feet> for Inches {
    fn from(ft: Feet) -> Self {
        Inches(ft.0 * INCHES_PER_FOOT)
    }
}

impl From<Inches> for Feet {
    fn from(inches: Inches) -> Self {
        Feet(inches.0 / INCHES_PER_FOOT)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqFt(pub f64);

// ============================================================================
// Volume Units
// ============================================================================

/// Volume in cubic feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CuFt(pub f64);

/// Volume in cubic meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicMeters(pub f64);

impl From<CuFt> for CubicMeters {
    fn from(cuft: CuFt) -> Self {
        CubicMeters(cuft.0 / CUBIC_FEET_PER_CUBIC_METER)
    }
}

impl From<CubicMeters> for CuFt {
    fn from(m3: CubicMeters) -> Self {
        CuFt(m3.0 * CUBIC_FEET_PER_CUBIC_METER)
    }
}

impl CuFt {
    /// Volume of a box given its three edges in inches
    pub fn from_inches(a: Inches, b: Inches, c: Inches) -> Self {
        CuFt(a.0 * b.0 * c.0 / CUBIC_INCHES_PER_CUBIC_FOOT)
    }
}

// ============================================================================
// Mass Units
// ============================================================================

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

impl CubicMeters {
    /// Mass of this volume at the given bulk density (kg/m³)
    pub fn mass_at(self, density_kg_m3: f64) -> Kilograms {
        Kilograms(self.0 * density_kg_m3)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Feet);
impl_arithmetic!(Inches);
impl_arithmetic!(SqFt);
impl_arithmetic!(CuFt);
impl_arithmetic!(CubicMeters);
impl_arithmetic!(Kilograms);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inches_to_feet() {
        let inches = Inches(9.0);
        let ft: Feet = inches.into();
        assert_eq!(ft.0, 0.75);
    }

    #[test]
    fn test_box_volume() {
        let v = CuFt::from_inches(Inches(9.0), Inches(4.0), Inches(3.0));
        assert!((v.0 - 0.0625).abs() < 1e-12);
    }

    #[test]
    fn test_cubic_meter_mass() {
        let sand = CubicMeters(0.5).mass_at(1600.0);
        assert_eq!(sand.0, 800.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = SqFt(10.0);
        let b = SqFt(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_serialization() {
        let ft = Feet(12.5);
        let json = serde_json::to_string(&ft).unwrap();
        assert_eq!(json, "12.5");

        let roundtrip: Feet = serde_json::from_str(&json).unwrap();
        assert_eq!(ft, roundtrip);
    }
}
