//! # Estimation Settings
//!
//! Physical constants and allowances used by the calculators. Defaults
//! reproduce the standard takeoff; a JSON settings file may override any
//! subset of fields.
//!
//! ## Example
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "breakage_allowance": 0.07,
//!   "finishing_rates": { "low": 22.0, "medium": 32.0, "high": 48.0 }
//! }
//! ```
//!
//! ```rust,no_run
//! use estimate_core::settings::load_settings;
//! use std::path::Path;
//!
//! let settings = load_settings(Path::new("estimate.settings.json"))?;
//! println!("breakage: {}", settings.breakage_allowance);
//! # Ok::<(), estimate_core::errors::EstimateError>(())
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcResult, EstimateError};
use crate::materials::FinishRoughness;

/// Current schema version for settings files
pub const SETTINGS_VERSION: &str = "0.1.0";

/// Constants and allowances for quantity and cost derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateSettings {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Extra units ordered for breakage and cutting (0.05 = 5%)
    pub breakage_allowance: f64,

    /// Wet-to-dry mortar volume multiplier
    pub dry_volume_factor: f64,

    /// Mortar wastage multiplier
    pub mortar_wastage: f64,

    /// Cement parts in the mortar mix (by volume)
    pub cement_parts: f64,

    /// Sand parts in the mortar mix (by volume)
    pub sand_parts: f64,

    /// Bulk density of cement (kg/m³)
    pub cement_density_kg_m3: f64,

    /// Mass of one cement bag (kg)
    pub cement_bag_kg: f64,

    /// Bulk density of sand (kg/m³)
    pub sand_density_kg_m3: f64,

    /// Lower bound on the heuristic running length when no rooms are given (ft)
    pub min_running_length_ft: f64,

    /// Load-bearing thickness used to estimate average wall thickness (in)
    pub load_bearing_reference_in: f64,

    /// Partition thickness used to estimate average wall thickness (in)
    pub partition_reference_in: f64,

    /// Plastering surcharge per square foot of face area
    pub finishing_rates: FinishingRates,
}

impl EstimateSettings {
    fn mix_parts(&self) -> f64 {
        self.cement_parts + self.sand_parts
    }

    /// Share of the dry mortar volume that is cement
    pub fn cement_fraction(&self) -> f64 {
        let total = self.mix_parts();
        if total > 0.0 {
            self.cement_parts / total
        } else {
            0.0
        }
    }

    /// Share of the dry mortar volume that is sand
    pub fn sand_fraction(&self) -> f64 {
        let total = self.mix_parts();
        if total > 0.0 {
            self.sand_parts / total
        } else {
            0.0
        }
    }

    /// Cement bags per cubic meter of cement (1440 / 50 = 28.8 by default)
    pub fn bags_per_cubic_meter(&self) -> f64 {
        if self.cement_bag_kg > 0.0 {
            self.cement_density_kg_m3 / self.cement_bag_kg
        } else {
            0.0
        }
    }
}

impl Default for EstimateSettings {
    fn default() -> Self {
        EstimateSettings {
            version: SETTINGS_VERSION.to_string(),
            breakage_allowance: 0.05,
            dry_volume_factor: 1.33,
            mortar_wastage: 1.15,
            cement_parts: 1.0,
            sand_parts: 6.0,
            cement_density_kg_m3: 1440.0,
            cement_bag_kg: 50.0,
            sand_density_kg_m3: 1600.0,
            min_running_length_ft: 200.0,
            load_bearing_reference_in: 9.0,
            partition_reference_in: 4.5,
            finishing_rates: FinishingRates::default(),
        }
    }
}

/// Plastering surcharge per square foot, by surface roughness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinishingRates {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl FinishingRates {
    /// Rate for a roughness; unknown roughness uses the low rate
    pub fn rate_for(&self, roughness: Option<FinishRoughness>) -> f64 {
        match roughness {
            Some(FinishRoughness::High) => self.high,
            Some(FinishRoughness::Medium) => self.medium,
            Some(FinishRoughness::Low) | Some(FinishRoughness::Unknown) | None => self.low,
        }
    }
}

impl Default for FinishingRates {
    fn default() -> Self {
        FinishingRates {
            low: 20.0,
            medium: 30.0,
            high: 45.0,
        }
    }
}

/// Load settings from a JSON file.
///
/// # Returns
///
/// * `Ok(EstimateSettings)` - Settings with unspecified fields defaulted
/// * `Err(EstimateError::VersionMismatch)` - File version is incompatible
/// * `Err(EstimateError::SerializationError)` - Invalid JSON
/// * `Err(EstimateError::FileError)` - I/O error
pub fn load_settings(path: &Path) -> CalcResult<EstimateSettings> {
    let contents = fs::read_to_string(path)
        .map_err(|e| EstimateError::file_error("read", path.display().to_string(), e.to_string()))?;

    let settings: EstimateSettings =
        serde_json::from_str(&contents).map_err(|e| EstimateError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&settings.version)?;

    Ok(settings)
}

/// Validate that a settings file version is compatible with this build.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || EstimateError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SETTINGS_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SETTINGS_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // For 0.x versions, a newer minor version may carry breaking changes
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    #[test]
    fn test_default_mix() {
        let s = EstimateSettings::default();
        assert!((s.cement_fraction() - 1.0 / 7.0).abs() < 1e-12);
        assert!((s.sand_fraction() - 6.0 / 7.0).abs() < 1e-12);
        assert!((s.bags_per_cubic_meter() - 28.8).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s: EstimateSettings = serde_json::from_str(r#"{"breakage_allowance": 0.1}"#).unwrap();
        assert_eq!(s.breakage_allowance, 0.1);
        assert_eq!(s.mortar_wastage, 1.15);
        assert_eq!(s.version, SETTINGS_VERSION);
    }

    #[test]
    fn test_finishing_rate_lookup() {
        let rates = FinishingRates::default();
        assert_eq!(rates.rate_for(Some(FinishRoughness::High)), 45.0);
        assert_eq!(rates.rate_for(Some(FinishRoughness::Medium)), 30.0);
        assert_eq!(rates.rate_for(None), 20.0);
        assert_eq!(rates.rate_for(Some(FinishRoughness::Unknown)), 20.0);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SETTINGS_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("latest").is_err());
    }

    #[test]
    fn test_load_settings_file() {
        let path = temp_dir().join("estimate_settings_test.json");
        fs::write(&path, r#"{"version": "0.1.0", "sand_density_kg_m3": 1500.0}"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.sand_density_kg_m3, 1500.0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_settings(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
