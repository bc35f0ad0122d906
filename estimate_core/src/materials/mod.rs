//! # Materials Catalog
//!
//! Catalog entries as delivered by the external catalog store, plus the
//! role table that maps a material onto the structural role it can fill.
//!
//! ## Roles
//!
//! - **LoadBearing**: `category == "Wall"` and sub-category `LoadBearing`
//! - **Partition**: `category == "Wall"` and sub-category `Partition`
//!   (or its alias `NonLoadBearing`)
//! - **Cement**: `type == "Cement"`
//! - **Sand**: `type == "Sand"`
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "id": "brk-red-01",
//!   "name": "Red Clay Brick",
//!   "category": "Wall",
//!   "subCategory": "LoadBearing",
//!   "type": "Brick",
//!   "dimensions": "9x4x3",
//!   "pricePerUnit": "12.5",
//!   "unit": "piece",
//!   "requiresPlastering": true,
//!   "finishRoughness": "medium"
//! }
//! ```

pub mod pricing;

pub use pricing::PricingUnit;

use serde::{Deserialize, Serialize};

use crate::dimensions::{numeric, UnitDimensions};

/// Catalog category name for wall units
pub const WALL_CATEGORY: &str = "Wall";

/// Wall sub-category of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallSubCategory {
    LoadBearing,
    #[serde(alias = "NonLoadBearing")]
    Partition,
    #[serde(other)]
    Other,
}

/// Physical kind of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MaterialType {
    Brick,
    Block,
    Stone,
    Cement,
    Sand,
    #[default]
    #[serde(other)]
    Other,
}

/// Surface roughness, used to pick the plastering rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishRoughness {
    #[serde(alias = "Low")]
    Low,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "High")]
    High,
    /// Any other label; priced like `low`
    #[serde(other)]
    Unknown,
}

/// Wall finish chosen for the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinishType {
    Plastered,
    Exposed,
}

/// A catalog entry. Read-only from the engine's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sub_category: Option<WallSubCategory>,
    #[serde(rename = "type", default)]
    pub material_type: MaterialType,
    /// `"L x W x H"` in inches; absent for cement/sand
    #[serde(default)]
    pub dimensions: Option<String>,
    /// Price per declared `unit`
    #[serde(deserialize_with = "numeric::deserialize")]
    pub price_per_unit: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub requires_plastering: Option<bool>,
    #[serde(default)]
    pub finish_roughness: Option<FinishRoughness>,
}

impl Material {
    pub fn is_wall(&self) -> bool {
        self.category == WALL_CATEGORY
    }

    /// Unit dimensions, or the default brick when absent or malformed
    pub fn unit_dimensions(&self) -> UnitDimensions {
        UnitDimensions::parse_or_default(self.dimensions.as_deref())
    }

    /// Plastering applies unless the catalog explicitly says otherwise
    pub fn is_plastering_eligible(&self) -> bool {
        self.requires_plastering.unwrap_or(true)
    }

    /// Price with NaN/negative values treated as zero
    pub fn unit_price(&self) -> f64 {
        if self.price_per_unit.is_finite() && self.price_per_unit > 0.0 {
            self.price_per_unit
        } else {
            0.0
        }
    }

    pub fn pricing_unit(&self) -> PricingUnit {
        PricingUnit::parse(&self.unit)
    }
}

/// Structural role a selected material fills.
///
/// Role is a tag, not a type: formulas dispatch on it through the methods
/// below rather than through separate material types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialRole {
    LoadBearing,
    Partition,
    Cement,
    Sand,
}

impl MaterialRole {
    pub const ALL: [MaterialRole; 4] = [
        MaterialRole::LoadBearing,
        MaterialRole::Partition,
        MaterialRole::Cement,
        MaterialRole::Sand,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialRole::LoadBearing => "Load-bearing wall",
            MaterialRole::Partition => "Partition wall",
            MaterialRole::Cement => "Cement",
            MaterialRole::Sand => "Sand",
        }
    }

    /// Catalog filter predicate for this role
    pub fn matches(&self, material: &Material) -> bool {
        match self {
            MaterialRole::LoadBearing => {
                material.is_wall() && material.sub_category == Some(WallSubCategory::LoadBearing)
            }
            MaterialRole::Partition => {
                material.is_wall() && material.sub_category == Some(WallSubCategory::Partition)
            }
            MaterialRole::Cement => material.material_type == MaterialType::Cement,
            MaterialRole::Sand => material.material_type == MaterialType::Sand,
        }
    }
}

impl std::fmt::Display for MaterialRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Look up a material by id in a catalog snapshot
pub fn find<'a>(catalog: &'a [Material], id: &str) -> Option<&'a Material> {
    catalog.iter().find(|m| m.id == id)
}

/// All catalog entries that can fill `role`, in catalog order
pub fn candidates(catalog: &[Material], role: MaterialRole) -> Vec<&Material> {
    catalog.iter().filter(|m| role.matches(m)).collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn wall(id: &str, sub: WallSubCategory, dims: &str, price: f64) -> Material {
        Material {
            id: id.to_string(),
            name: format!("Brick {}", id),
            category: WALL_CATEGORY.to_string(),
            sub_category: Some(sub),
            material_type: MaterialType::Brick,
            dimensions: Some(dims.to_string()),
            price_per_unit: price,
            unit: "piece".to_string(),
            requires_plastering: None,
            finish_roughness: None,
        }
    }

    pub fn consumable(id: &str, kind: MaterialType, unit: &str, price: f64) -> Material {
        Material {
            id: id.to_string(),
            name: format!("{:?} {}", kind, id),
            category: "Binding".to_string(),
            sub_category: None,
            material_type: kind,
            dimensions: None,
            price_per_unit: price,
            unit: unit.to_string(),
            requires_plastering: None,
            finish_roughness: None,
        }
    }
}
