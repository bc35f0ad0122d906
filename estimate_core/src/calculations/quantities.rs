//! # Brick & Mortar Quantities
//!
//! Turns net wall area and a composition split into unit counts and mortar
//! constituents for the chosen materials.
//!
//! ## Method
//!
//! 1. Running length: sum of room perimeters, or `max(200, 4 * sqrt(area))`
//!    when no rooms are given. Internal partitions shared by two rooms are
//!    counted twice.
//! 2. Net area = running length x height x (1 - opening / 100)
//! 3. Load-bearing / partition face areas = net area x composition ratio
//! 4. Units: `layers = max(1, round(target / unit width))`,
//!    `qty = ceil(face / ((L + j)(H + j)) * layers * 1.05)`
//! 5. Mortar: wall volume x void fraction x 1.33 (dry) x 1.15 (wastage),
//!    split 1:6 cement to sand by volume
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::calculations::quantities::brick_count;
//! use estimate_core::dimensions::UnitDimensions;
//! use estimate_core::settings::EstimateSettings;
//! use estimate_core::units::SqFt;
//!
//! let qty = brick_count(
//!     SqFt(100.0),
//!     &UnitDimensions::DEFAULT_BRICK,
//!     9.0,
//!     0.375,
//!     &EstimateSettings::default(),
//! );
//! assert_eq!(qty, 956);
//! ```

use serde::{Deserialize, Serialize};

use crate::composition::{ResolvedComposition, Room};
use crate::dimensions::{finite_or_zero, UnitDimensions};
use crate::materials::{Material, MaterialRole};
use crate::settings::EstimateSettings;
use crate::tier::Tier;
use crate::units::{CubicMeters, CuFt, Feet, Inches, SqFt};

/// Inputs for a takeoff.
///
/// ## JSON Example
///
/// ```json
/// {
///   "total_area_sqft": 1200.0,
///   "rooms": [{ "length": "12", "width": "10" }],
///   "tier": "Standard",
///   "height_ft": 10.0,
///   "wall_thickness_in": 9.0,
///   "joint_thickness_in": 0.375,
///   "opening_deduction_percent": 15.0,
///   "partition_wall_thickness_in": 4.5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationInputs {
    /// Built-up area (sq ft)
    pub total_area_sqft: f64,

    /// Rooms in plan order
    pub rooms: Vec<Room>,

    pub tier: Tier,

    /// Wall height (ft)
    pub height_ft: f64,

    /// Load-bearing wall thickness (in)
    pub wall_thickness_in: f64,

    /// Mortar joint thickness (in)
    pub joint_thickness_in: f64,

    /// Share of gross wall area taken by openings (0-100)
    pub opening_deduction_percent: f64,

    /// Partition wall thickness (in)
    pub partition_wall_thickness_in: f64,
}

impl CalculationInputs {
    /// Typical inputs for a tier: 10 ft walls, 9 in load-bearing, 3/8 in joints
    pub fn for_tier(tier: Tier) -> Self {
        CalculationInputs {
            total_area_sqft: 0.0,
            rooms: Vec::new(),
            tier,
            height_ft: 10.0,
            wall_thickness_in: 9.0,
            joint_thickness_in: 0.375,
            opening_deduction_percent: 0.0,
            partition_wall_thickness_in: tier.default_partition_thickness_in(),
        }
    }

    /// Target wall thickness for a wall role (in); zero for mortar roles
    pub fn target_thickness_in(&self, role: MaterialRole) -> f64 {
        match role {
            MaterialRole::LoadBearing => self.wall_thickness_in,
            MaterialRole::Partition => self.partition_wall_thickness_in,
            MaterialRole::Cement | MaterialRole::Sand => 0.0,
        }
    }

    fn joint_in(&self) -> f64 {
        finite_or_zero(self.joint_thickness_in).max(0.0)
    }

    fn is_computable(&self) -> bool {
        self.height_ft.is_finite()
            && self.height_ft > 0.0
            && self.wall_thickness_in.is_finite()
            && self.wall_thickness_in > 0.0
    }
}

impl Default for CalculationInputs {
    fn default() -> Self {
        CalculationInputs::for_tier(Tier::default())
    }
}

/// Quantities for the current inputs and selection.
///
/// Unit counts, cement bags and sand kilograms are rounded up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalculationResult {
    /// Load-bearing units (count)
    pub load_bearing_qty: u64,
    /// Partition units (count)
    pub partition_qty: u64,
    /// Cement (50 kg bags)
    pub cement_qty: u64,
    /// Sand (kg)
    pub sand_qty: u64,
    /// Dry mortar volume for both roles (m³)
    pub mortar_volume_m3: f64,
    pub running_length_ft: f64,
    pub load_bearing_area_sqft: f64,
    pub partition_area_sqft: f64,
    /// Net area assigned to neither role
    pub unallocated_area_sqft: f64,
}

/// Face area per wall role
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WallAreas {
    pub load_bearing: SqFt,
    pub partition: SqFt,
    pub unallocated: SqFt,
}

impl WallAreas {
    /// Split net area by the composition ratios
    pub fn split(net: SqFt, composition: &ResolvedComposition) -> Self {
        let ratio = |r: f64| finite_or_zero(r).max(0.0);
        let load_bearing = net * ratio(composition.main_ratio);
        let partition = net * ratio(composition.partition_ratio);
        let unallocated = SqFt((net.0 - load_bearing.0 - partition.0).max(0.0));
        WallAreas {
            load_bearing,
            partition,
            unallocated,
        }
    }

    pub fn for_role(&self, role: MaterialRole) -> SqFt {
        match role {
            MaterialRole::LoadBearing => self.load_bearing,
            MaterialRole::Partition => self.partition,
            MaterialRole::Cement | MaterialRole::Sand => SqFt(0.0),
        }
    }
}

/// Total running wall length
pub fn running_length(inputs: &CalculationInputs, settings: &EstimateSettings) -> Feet {
    if !inputs.rooms.is_empty() {
        return Feet(inputs.rooms.iter().map(Room::perimeter_ft).sum());
    }
    let area = finite_or_zero(inputs.total_area_sqft).max(0.0);
    Feet((4.0 * area.sqrt()).max(settings.min_running_length_ft))
}

/// Wall face area after the opening deduction
pub fn net_wall_area(inputs: &CalculationInputs, settings: &EstimateSettings) -> SqFt {
    if !inputs.is_computable() {
        return SqFt(0.0);
    }
    let opening = finite_or_zero(inputs.opening_deduction_percent).clamp(0.0, 100.0);
    let gross = running_length(inputs, settings).0 * inputs.height_ft;
    SqFt(gross * (1.0 - opening / 100.0))
}

/// Number of unit widths needed to build up `target_in`
pub fn layers_for(target_in: f64, dims: &UnitDimensions) -> f64 {
    if dims.width_in <= 0.0 {
        return 1.0;
    }
    (target_in / dims.width_in).round().max(1.0)
}

/// Face area of one unit plus its bed and head joint
pub fn unit_face_area(dims: &UnitDimensions, joint_in: f64) -> SqFt {
    let length: Feet = Inches(dims.length_in + joint_in).into();
    let height: Feet = Inches(dims.height_in + joint_in).into();
    SqFt(length.0 * height.0)
}

/// Units needed to build `face_area` to `target_in` thickness, including
/// the breakage allowance.
pub fn brick_count(
    face_area: SqFt,
    dims: &UnitDimensions,
    target_in: f64,
    joint_in: f64,
    settings: &EstimateSettings,
) -> u64 {
    if !(face_area.0 > 0.0) || !(target_in > 0.0) {
        return 0;
    }
    let unit_area = unit_face_area(dims, joint_in.max(0.0));
    if !(unit_area.0 > 0.0) {
        return 0;
    }
    let layers = layers_for(target_in, dims);
    let qty = face_area.0 / unit_area.0 * layers * (1.0 + settings.breakage_allowance);
    if qty.is_finite() {
        qty.ceil() as u64
    } else {
        0
    }
}

/// Dry mortar volume for one role.
///
/// The wall is `layers` unit widths thick; mortar fills the joint share of
/// each unit's gross volume.
pub fn mortar_volume(
    face_area: SqFt,
    dims: &UnitDimensions,
    target_in: f64,
    joint_in: f64,
    settings: &EstimateSettings,
) -> CubicMeters {
    if !(face_area.0 > 0.0) || !(target_in > 0.0) {
        return CubicMeters(0.0);
    }
    let layers = layers_for(target_in, dims);
    let unit_width: Feet = Inches(dims.width_in).into();
    let wall_volume = CuFt(face_area.0 * unit_width.0 * layers);
    let wet = wall_volume * dims.void_fraction(joint_in.max(0.0));
    let dry = wet * settings.dry_volume_factor * settings.mortar_wastage;
    let volume: CubicMeters = dry.into();
    if volume.0.is_finite() {
        CubicMeters(volume.0.max(0.0))
    } else {
        CubicMeters(0.0)
    }
}

/// Cement bags for a dry mortar volume
pub fn cement_bags(mortar: CubicMeters, settings: &EstimateSettings) -> u64 {
    let bags = mortar.0 * settings.cement_fraction() * settings.bags_per_cubic_meter();
    round_up_count(bags)
}

/// Sand mass (kg) for a dry mortar volume
pub fn sand_kg(mortar: CubicMeters, settings: &EstimateSettings) -> u64 {
    let sand = (mortar * settings.sand_fraction()).mass_at(settings.sand_density_kg_m3);
    round_up_count(sand.0)
}

fn round_up_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.ceil() as u64
    } else {
        0
    }
}

/// Compute unit counts and mortar constituents.
///
/// Total: returns an all-zero result for non-positive height or wall
/// thickness, or when neither wall material is present. A missing material
/// contributes nothing for its role.
pub fn compute_quantities(
    inputs: &CalculationInputs,
    load_bearing: Option<&Material>,
    partition: Option<&Material>,
    composition: &ResolvedComposition,
    settings: &EstimateSettings,
) -> CalculationResult {
    if !inputs.is_computable() || (load_bearing.is_none() && partition.is_none()) {
        return CalculationResult::default();
    }

    let net = net_wall_area(inputs, settings);
    let areas = WallAreas::split(net, composition);
    let joint = inputs.joint_in();

    let mut result = CalculationResult {
        running_length_ft: running_length(inputs, settings).0,
        load_bearing_area_sqft: areas.load_bearing.0,
        partition_area_sqft: areas.partition.0,
        unallocated_area_sqft: areas.unallocated.0,
        ..Default::default()
    };

    let mut mortar = CubicMeters(0.0);
    for (role, material) in [
        (MaterialRole::LoadBearing, load_bearing),
        (MaterialRole::Partition, partition),
    ] {
        let Some(material) = material else {
            continue;
        };
        let dims = material.unit_dimensions();
        let face = areas.for_role(role);
        let target = inputs.target_thickness_in(role);

        let qty = brick_count(face, &dims, target, joint, settings);
        match role {
            MaterialRole::LoadBearing => result.load_bearing_qty = qty,
            _ => result.partition_qty = qty,
        }
        mortar = mortar + mortar_volume(face, &dims, target, joint, settings);
    }

    result.mortar_volume_m3 = mortar.0;
    result.cement_qty = cement_bags(mortar, settings);
    result.sand_qty = sand_kg(mortar, settings);
    result
}
