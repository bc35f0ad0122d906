//! # Dimension Parsing
//!
//! Catalog entries describe a masonry unit as an `"L x W x H"` string in
//! inches (`"9x4x3"`, `"24 x 3 x 8"`, `9" × 4.5" × 3"`). Width is the unit's
//! thickness through the wall.
//!
//! Parsing is strict ([`UnitDimensions::parse`]) but the calculators use
//! [`UnitDimensions::parse_or_default`], which substitutes a standard
//! 9 x 4 x 3 in brick so a bad catalog string never stops an estimate.
//!
//! ```rust
//! use estimate_core::dimensions::UnitDimensions;
//!
//! let dims = UnitDimensions::parse("24 x 3 x 8").unwrap();
//! assert_eq!(dims.width_in, 3.0);
//!
//! let fallback = UnitDimensions::parse_or_default(Some("about nine inches"));
//! assert_eq!(fallback, UnitDimensions::DEFAULT_BRICK);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcResult, EstimateError};
use crate::units::{CuFt, Inches};

/// Physical size of a single masonry unit, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitDimensions {
    /// Face length along the wall run
    pub length_in: f64,
    /// Thickness through the wall
    pub width_in: f64,
    /// Course height
    pub height_in: f64,
}

impl UnitDimensions {
    /// Standard 9 x 4 x 3 in brick used when a catalog entry has no usable size
    pub const DEFAULT_BRICK: UnitDimensions = UnitDimensions {
        length_in: 9.0,
        width_in: 4.0,
        height_in: 3.0,
    };

    /// Parse an `"L x W x H"` string.
    ///
    /// Accepts `x`, `X`, `*` and `×` as separators and ignores inch marks.
    /// Exactly three finite, positive components are required.
    pub fn parse(raw: &str) -> CalcResult<Self> {
        let cleaned = raw.to_lowercase().replace(['×', '*'], "x");
        let parts: Vec<&str> = cleaned.split('x').map(strip_inch_mark).collect();
        if parts.len() != 3 {
            return Err(EstimateError::malformed_dimensions(
                raw,
                format!("expected 3 components, found {}", parts.len()),
            ));
        }

        let mut values = [0.0_f64; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            let value: f64 = part.parse().map_err(|_| {
                EstimateError::malformed_dimensions(raw, format!("'{}' is not a number", part))
            })?;
            if !value.is_finite() || value <= 0.0 {
                return Err(EstimateError::malformed_dimensions(
                    raw,
                    format!("'{}' must be a positive number", part),
                ));
            }
            *slot = value;
        }

        Ok(UnitDimensions {
            length_in: values[0],
            width_in: values[1],
            height_in: values[2],
        })
    }

    /// Parse a dimension string, falling back to [`Self::DEFAULT_BRICK`].
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw {
            Some(s) => Self::parse(s).unwrap_or_else(|e| {
                debug!(error = %e, "using default brick dimensions");
                Self::DEFAULT_BRICK
            }),
            None => Self::DEFAULT_BRICK,
        }
    }

    /// Net volume of the unit itself
    pub fn unit_volume(&self) -> CuFt {
        CuFt::from_inches(Inches(self.length_in), Inches(self.width_in), Inches(self.height_in))
    }

    /// Gross volume of the unit plus one mortar joint on each axis
    pub fn gross_volume(&self, joint_in: f64) -> CuFt {
        CuFt::from_inches(
            Inches(self.length_in + joint_in),
            Inches(self.width_in + joint_in),
            Inches(self.height_in + joint_in),
        )
    }

    /// Fraction of the gross (unit + joint) volume taken by mortar
    pub fn void_fraction(&self, joint_in: f64) -> f64 {
        let gross = self.gross_volume(joint_in).0;
        if gross <= 0.0 {
            return 0.0;
        }
        ((gross - self.unit_volume().0) / gross).max(0.0)
    }
}

impl Default for UnitDimensions {
    fn default() -> Self {
        Self::DEFAULT_BRICK
    }
}

/// Trim one component and drop a trailing inch mark (`"`, `in`, `inch`,
/// `inches`).
fn strip_inch_mark(part: &str) -> &str {
    let part = part.trim();
    ["inches", "inch", "in", "\""]
        .iter()
        .find_map(|mark| part.strip_suffix(*mark))
        .unwrap_or(part)
        .trim_end()
}

/// True when the string parses and the unit is 3 in thick.
///
/// Used to recognise thin AAC partition blocks.
pub fn is_three_inch_profile(raw: Option<&str>) -> bool {
    raw.and_then(|s| UnitDimensions::parse(s).ok())
        .map(|d| (d.width_in - 3.0).abs() < 1e-9)
        .unwrap_or(false)
}

/// Serde helpers for numeric fields that the upstream stores sometimes send
/// as strings (`"12.5"`). Unparseable strings read as NaN; consumers decide
/// whether NaN means "invalid" or "zero".
pub mod numeric {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    impl NumberOrString {
        fn into_f64(self) -> f64 {
            match self {
                NumberOrString::Number(n) => n,
                NumberOrString::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        NumberOrString::deserialize(deserializer).map(NumberOrString::into_f64)
    }

    pub mod option {
        use super::NumberOrString;
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Ok(Option::<NumberOrString>::deserialize(deserializer)?.map(NumberOrString::into_f64))
        }
    }
}

/// Replace NaN/infinite values with zero.
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
