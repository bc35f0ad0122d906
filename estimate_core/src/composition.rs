//! # Wall Composition
//!
//! Determines how the wall footprint splits between load-bearing walls,
//! partitions and openings. Three sources are tried in strict order:
//!
//! 1. A composition supplied by the caller (used as-is when its three
//!    percentages are finite and non-negative)
//! 2. One call to an external [`CompositionDetector`] (rooms present,
//!    total area positive, detector configured)
//! 3. An average of the per-room `wallMetadata`
//!
//! If none applies the previous composition is kept.
//!
//! Openings are not a third share of the split: they are deducted from the
//! gross wall area before the load-bearing and partition ratios apply, so
//! `mainRatio + partitionRatio` may be less than 1 and the remainder is left
//! unallocated.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::composition::{resolve, ResolvedComposition, Room, WallComposition};
//! use estimate_core::settings::EstimateSettings;
//!
//! let supplied = WallComposition::new(60.0, 30.0, 10.0);
//! let rooms = vec![Room::new(12.0, 10.0)];
//! let settings = EstimateSettings::default();
//!
//! let resolved = block_on(resolve(
//!     Some(&supplied),
//!     &rooms,
//!     1200.0,
//!     None,
//!     &ResolvedComposition::default(),
//!     &settings,
//! ))
//! .unwrap();
//! assert_eq!(resolved.main_ratio, 0.6);
//! # fn block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dimensions::{finite_or_zero, numeric};
use crate::errors::{CalcResult, EstimateError};
use crate::settings::EstimateSettings;

/// A room from the floor plan. Lengths in feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(deserialize_with = "numeric::deserialize")]
    pub length: f64,
    #[serde(deserialize_with = "numeric::deserialize")]
    pub width: f64,
    #[serde(default)]
    pub wall_metadata: Option<WallMetadata>,
    /// Share of this room's wall area taken by doors and windows (0-100)
    #[serde(default, deserialize_with = "numeric::option::deserialize")]
    pub opening_percentage: Option<f64>,
}

impl Room {
    pub fn new(length_ft: f64, width_ft: f64) -> Self {
        Room {
            length: length_ft,
            width: width_ft,
            wall_metadata: None,
            opening_percentage: None,
        }
    }

    pub fn with_metadata(mut self, main_wall_ratio: f64, partition_wall_ratio: f64) -> Self {
        self.wall_metadata = Some(WallMetadata {
            main_wall_ratio,
            partition_wall_ratio,
        });
        self
    }

    pub fn with_opening(mut self, opening_percentage: f64) -> Self {
        self.opening_percentage = Some(opening_percentage);
        self
    }

    /// Perimeter `2 * (length + width)`; unusable sides count as zero
    pub fn perimeter_ft(&self) -> f64 {
        let side = |v: f64| finite_or_zero(v).max(0.0);
        2.0 * (side(self.length) + side(self.width))
    }
}

/// Per-room wall split as fractions (0-1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallMetadata {
    #[serde(deserialize_with = "numeric::deserialize")]
    pub main_wall_ratio: f64,
    #[serde(deserialize_with = "numeric::deserialize")]
    pub partition_wall_ratio: f64,
}

/// Composition as percentages (0-100), supplied or detected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallComposition {
    #[serde(deserialize_with = "numeric::deserialize")]
    pub load_bearing_percentage: f64,
    #[serde(deserialize_with = "numeric::deserialize")]
    pub partition_percentage: f64,
    #[serde(deserialize_with = "numeric::deserialize")]
    pub opening_percentage: f64,
    /// Average wall thickness in inches, when known
    #[serde(default, deserialize_with = "numeric::option::deserialize")]
    pub average_wall_thickness: Option<f64>,
}

impl WallComposition {
    pub fn new(load_bearing: f64, partition: f64, opening: f64) -> Self {
        WallComposition {
            load_bearing_percentage: load_bearing,
            partition_percentage: partition,
            opening_percentage: opening,
            average_wall_thickness: None,
        }
    }

    pub fn with_thickness(mut self, average_wall_thickness_in: f64) -> Self {
        self.average_wall_thickness = Some(average_wall_thickness_in);
        self
    }

    fn percentages(&self) -> [f64; 3] {
        [
            self.load_bearing_percentage,
            self.partition_percentage,
            self.opening_percentage,
        ]
    }

    /// Usable as a caller-supplied composition
    pub fn is_usable(&self) -> bool {
        self.percentages().iter().all(|p| p.is_finite() && *p >= 0.0)
    }

    /// Check a detector result: each percentage in [0, 100], sum positive.
    pub fn validate_detected(&self) -> CalcResult<()> {
        let names = ["loadBearingPercentage", "partitionPercentage", "openingPercentage"];
        for (name, value) in names.iter().zip(self.percentages()) {
            if !value.is_finite() {
                return Err(EstimateError::invalid_composition(format!("{} is not a number", name)));
            }
            if !(0.0..=100.0).contains(&value) {
                return Err(EstimateError::invalid_composition(format!(
                    "{} = {} is outside 0-100",
                    name, value
                )));
            }
        }
        if self.percentages().iter().sum::<f64>() <= 0.0 {
            return Err(EstimateError::invalid_composition("all percentages are zero"));
        }
        Ok(())
    }
}

/// Where the active composition came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CompositionSource {
    #[default]
    Unresolved,
    Supplied,
    Detected,
    RoomAverage,
}

/// Composition in the form the calculators consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResolvedComposition {
    /// Load-bearing share of net wall area (0-1)
    pub main_ratio: f64,
    /// Partition share of net wall area (0-1)
    pub partition_ratio: f64,
    /// Opening deduction (0-100)
    pub opening_percent: f64,
    /// Estimated average wall thickness (in)
    pub wall_thickness_estimate_in: f64,
    pub source: CompositionSource,
    /// True once any source has produced a composition
    pub detected: bool,
}

impl ResolvedComposition {
    fn from_percentages(
        composition: &WallComposition,
        source: CompositionSource,
        settings: &EstimateSettings,
    ) -> Self {
        let main_ratio = composition.load_bearing_percentage / 100.0;
        let partition_ratio = composition.partition_percentage / 100.0;
        let wall_thickness_estimate_in = match composition.average_wall_thickness {
            Some(t) if t.is_finite() && t > 0.0 => t,
            _ => weighted_thickness(main_ratio, partition_ratio, settings),
        };
        ResolvedComposition {
            main_ratio,
            partition_ratio,
            opening_percent: composition.opening_percentage,
            wall_thickness_estimate_in,
            source,
            detected: true,
        }
    }

    /// Share of net wall area assigned to neither role
    pub fn unallocated_ratio(&self) -> f64 {
        (1.0 - self.main_ratio - self.partition_ratio).max(0.0)
    }
}

/// Ratio-weighted average of the reference load-bearing and partition
/// thicknesses; the load-bearing reference when both ratios are zero.
fn weighted_thickness(main_ratio: f64, partition_ratio: f64, settings: &EstimateSettings) -> f64 {
    let total = main_ratio + partition_ratio;
    if total > 0.0 {
        (settings.load_bearing_reference_in * main_ratio
            + settings.partition_reference_in * partition_ratio)
            / total
    } else {
        settings.load_bearing_reference_in
    }
}

/// External wall-composition detector (floor-plan analysis service).
#[async_trait]
pub trait CompositionDetector: Send + Sync {
    async fn detect(&self, rooms: &[Room], total_area_sqft: f64) -> CalcResult<WallComposition>;
}

/// Average per-room wall metadata.
///
/// Ratios are averaged over the rooms that carry metadata; the opening
/// percentage is averaged over every room (rooms without one count as 0).
/// Returns `None` when no room has metadata.
pub fn average_from_rooms(rooms: &[Room], settings: &EstimateSettings) -> Option<ResolvedComposition> {
    let with_metadata: Vec<&WallMetadata> =
        rooms.iter().filter_map(|r| r.wall_metadata.as_ref()).collect();
    if with_metadata.is_empty() {
        return None;
    }

    let n = with_metadata.len() as f64;
    let main_ratio = with_metadata
        .iter()
        .map(|m| finite_or_zero(m.main_wall_ratio))
        .sum::<f64>()
        / n;
    let partition_ratio = with_metadata
        .iter()
        .map(|m| finite_or_zero(m.partition_wall_ratio))
        .sum::<f64>()
        / n;
    let opening_percent = rooms
        .iter()
        .map(|r| finite_or_zero(r.opening_percentage.unwrap_or(0.0)))
        .sum::<f64>()
        / rooms.len() as f64;

    Some(ResolvedComposition {
        main_ratio,
        partition_ratio,
        opening_percent,
        wall_thickness_estimate_in: weighted_thickness(main_ratio, partition_ratio, settings),
        source: CompositionSource::RoomAverage,
        detected: true,
    })
}

/// Resolve the wall composition.
///
/// The detector, when it runs, is called exactly once; failures are
/// returned as recoverable errors and never fall through to the room
/// average. When no source applies `previous` is returned unchanged.
pub async fn resolve(
    supplied: Option<&WallComposition>,
    rooms: &[Room],
    total_area_sqft: f64,
    detector: Option<&dyn CompositionDetector>,
    previous: &ResolvedComposition,
    settings: &EstimateSettings,
) -> CalcResult<ResolvedComposition> {
    let fresh = try_resolve(supplied, rooms, total_area_sqft, detector, settings).await?;
    Ok(fresh.unwrap_or_else(|| previous.clone()))
}

/// Like [`resolve`], but returns `Ok(None)` when no source applies so the
/// caller can tell a fresh composition from a kept one.
pub async fn try_resolve(
    supplied: Option<&WallComposition>,
    rooms: &[Room],
    total_area_sqft: f64,
    detector: Option<&dyn CompositionDetector>,
    settings: &EstimateSettings,
) -> CalcResult<Option<ResolvedComposition>> {
    if let Some(composition) = supplied {
        if composition.is_usable() {
            debug!("using supplied wall composition");
            return Ok(Some(ResolvedComposition::from_percentages(
                composition,
                CompositionSource::Supplied,
                settings,
            )));
        }
        warn!(?composition, "ignoring supplied composition with invalid percentages");
    }

    if !rooms.is_empty() && total_area_sqft > 0.0 {
        if let Some(detector) = detector {
            info!(rooms = rooms.len(), total_area_sqft, "requesting wall composition detection");
            let detected = detector.detect(rooms, total_area_sqft).await.map_err(|e| match e {
                EstimateError::InvalidCompositionData { .. } | EstimateError::DetectionFailed { .. } => e,
                other => EstimateError::detection_failed(other.to_string()),
            })?;
            detected.validate_detected()?;
            return Ok(Some(ResolvedComposition::from_percentages(
                &detected,
                CompositionSource::Detected,
                settings,
            )));
        }
    }

    if let Some(averaged) = average_from_rooms(rooms, settings) {
        debug!(main_ratio = averaged.main_ratio, "averaged wall composition from rooms");
        return Ok(Some(averaged));
    }

    debug!("no composition source available");
    Ok(None)
}
