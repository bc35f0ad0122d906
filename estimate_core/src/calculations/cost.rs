//! # System Cost & Budget Checks
//!
//! Prices each role of the active selection and flags wall materials whose
//! unit price is more than twice the tier's nominal budget.
//!
//! Wall cost uses the same unit count as the quantity takeoff, plus a
//! plastering surcharge per square foot of face area when the project is
//! plastered and the material takes plaster.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::calculations::cost::budget_violation;
//! use estimate_core::materials::{Material, MaterialRole, MaterialType, WallSubCategory};
//! use estimate_core::tier::Tier;
//!
//! let brick = Material {
//!     id: "b".into(),
//!     name: "Engineering brick".into(),
//!     category: "Wall".into(),
//!     sub_category: Some(WallSubCategory::LoadBearing),
//!     material_type: MaterialType::Brick,
//!     dimensions: Some("9x4x3".into()),
//!     price_per_unit: 50.0,
//!     unit: "piece".into(),
//!     requires_plastering: None,
//!     finish_roughness: None,
//! };
//!
//! let check = budget_violation(Some(&brick), MaterialRole::LoadBearing, Tier::Standard);
//! assert!(check.violated);
//! assert_eq!(check.difference, 32_000);
//! ```

use serde::{Deserialize, Serialize};

use super::quantities::{brick_count, CalculationInputs, CalculationResult};
use super::RoleMaterials;
use crate::materials::{FinishType, Material, MaterialRole};
use crate::settings::EstimateSettings;
use crate::tier::Tier;
use crate::units::{Kilograms, SqFt};

/// A unit price is flagged once it exceeds this multiple of the budget
pub const BUDGET_VIOLATION_MULTIPLE: f64 = 2.0;

/// Budget check for one wall role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BudgetViolation {
    pub violated: bool,
    /// `(price - budget) * 1000`, rounded, for sub-unit display
    pub difference: i64,
}

/// Budget checks for both wall roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BudgetViolations {
    pub load_bearing: BudgetViolation,
    pub partition: BudgetViolation,
}

/// Rounded cost per role and in total (currency units)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SystemCosts {
    pub load_bearing: i64,
    pub partition: i64,
    pub cement: i64,
    pub sand: i64,
    pub total: i64,
}

fn round_currency(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}

/// Cost of building `face_area` from `material`, with optional plastering.
pub fn evaluate(
    material: &Material,
    face_area: SqFt,
    target_thickness_in: f64,
    joint_in: f64,
    finish: Option<FinishType>,
    settings: &EstimateSettings,
) -> i64 {
    let dims = material.unit_dimensions();
    let qty = brick_count(face_area, &dims, target_thickness_in, joint_in, settings);
    let mut cost = qty as f64 * material.unit_price();

    if finish == Some(FinishType::Plastered) && material.is_plastering_eligible() && face_area.0 > 0.0 {
        cost += face_area.0 * settings.finishing_rates.rate_for(material.finish_roughness);
    }

    round_currency(cost)
}

/// Compare a wall material's unit price against the tier budget.
///
/// Mortar roles and absent materials never violate.
pub fn budget_violation(material: Option<&Material>, role: MaterialRole, tier: Tier) -> BudgetViolation {
    let (Some(material), Some(budget)) = (material, tier.budget(role)) else {
        return BudgetViolation::default();
    };
    let price = material.unit_price();
    if price > BUDGET_VIOLATION_MULTIPLE * budget {
        BudgetViolation {
            violated: true,
            difference: round_currency((price - budget) * 1000.0),
        }
    } else {
        BudgetViolation::default()
    }
}

/// Cost of the cement or sand quantity in the catalog's pricing unit.
pub fn consumable_cost(
    material: &Material,
    role: MaterialRole,
    quantities: &CalculationResult,
    settings: &EstimateSettings,
) -> i64 {
    let (mass, natural, density) = match role {
        MaterialRole::Cement => {
            let bags = quantities.cement_qty as f64;
            (Kilograms(bags * settings.cement_bag_kg), bags, settings.cement_density_kg_m3)
        }
        MaterialRole::Sand => {
            let kg = quantities.sand_qty as f64;
            (Kilograms(kg), kg, settings.sand_density_kg_m3)
        }
        MaterialRole::LoadBearing | MaterialRole::Partition => return 0,
    };
    let units = material
        .pricing_unit()
        .units_for_mass(mass, natural, density, settings.cement_bag_kg);
    round_currency(units * material.unit_price())
}

/// Price every role of the selection against the takeoff.
pub fn system_costs(
    inputs: &CalculationInputs,
    materials: &RoleMaterials<'_>,
    quantities: &CalculationResult,
    finish: Option<FinishType>,
    settings: &EstimateSettings,
) -> SystemCosts {
    let joint = inputs.joint_thickness_in;
    let wall_cost = |role: MaterialRole, area: f64| {
        materials
            .get(role)
            .map(|m| evaluate(m, SqFt(area), inputs.target_thickness_in(role), joint, finish, settings))
            .unwrap_or(0)
    };
    let mortar_cost = |role: MaterialRole| {
        materials
            .get(role)
            .map(|m| consumable_cost(m, role, quantities, settings))
            .unwrap_or(0)
    };

    let load_bearing = wall_cost(MaterialRole::LoadBearing, quantities.load_bearing_area_sqft);
    let partition = wall_cost(MaterialRole::Partition, quantities.partition_area_sqft);
    let cement = mortar_cost(MaterialRole::Cement);
    let sand = mortar_cost(MaterialRole::Sand);

    SystemCosts {
        load_bearing,
        partition,
        cement,
        sand,
        total: load_bearing + partition + cement + sand,
    }
}

/// Budget checks for the selection's wall materials
pub fn budget_violations(materials: &RoleMaterials<'_>, tier: Tier) -> BudgetViolations {
    BudgetViolations {
        load_bearing: budget_violation(materials.load_bearing, MaterialRole::LoadBearing, tier),
        partition: budget_violation(materials.partition, MaterialRole::Partition, tier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::fixtures::{consumable, wall};
    use crate::materials::{FinishRoughness, MaterialType, WallSubCategory};

    fn settings() -> EstimateSettings {
        EstimateSettings::default()
    }

    #[test]
    fn test_budget_violation_standard_load_bearing() {
        let brick = wall("b", WallSubCategory::LoadBearing, "9x4x3", 50.0);
        let check = budget_violation(Some(&brick), MaterialRole::LoadBearing, Tier::Standard);
        assert!(check.violated);
        assert_eq!(check.difference, 32_000);
    }

    #[test]
    fn test_budget_within_double_is_ok() {
        // 36 is exactly 2 x 18: not over
        let brick = wall("b", WallSubCategory::LoadBearing, "9x4x3", 36.0);
        let check = budget_violation(Some(&brick), MaterialRole::LoadBearing, Tier::Standard);
        assert!(!check.violated);
        assert_eq!(check.difference, 0);
    }

    #[test]
    fn test_budget_ignores_mortar_and_absent() {
        let cement = consumable("c", MaterialType::Cement, "bag", 10_000.0);
        assert!(!budget_violation(Some(&cement), MaterialRole::Cement, Tier::Economy).violated);
        assert!(!budget_violation(None, MaterialRole::Partition, Tier::Economy).violated);
    }

    #[test]
    fn test_evaluate_exposed() {
        let brick = wall("b", WallSubCategory::LoadBearing, "9x4x3", 10.0);
        // 956 units x 10
        let cost = evaluate(&brick, SqFt(100.0), 9.0, 0.375, Some(FinishType::Exposed), &settings());
        assert_eq!(cost, 9560);
    }

    #[test]
    fn test_evaluate_plastered_by_roughness() {
        let mut brick = wall("b", WallSubCategory::LoadBearing, "9x4x3", 10.0);
        let plastered = Some(FinishType::Plastered);

        // default roughness -> 20 per sq ft
        assert_eq!(evaluate(&brick, SqFt(100.0), 9.0, 0.375, plastered, &settings()), 9560 + 2000);

        brick.finish_roughness = Some(FinishRoughness::High);
        assert_eq!(evaluate(&brick, SqFt(100.0), 9.0, 0.375, plastered, &settings()), 9560 + 4500);

        brick.finish_roughness = Some(FinishRoughness::Medium);
        assert_eq!(evaluate(&brick, SqFt(100.0), 9.0, 0.375, plastered, &settings()), 9560 + 3000);
    }

    #[test]
    fn test_evaluate_skips_plaster_for_ineligible() {
        let mut brick = wall("b", WallSubCategory::LoadBearing, "9x4x3", 10.0);
        brick.requires_plastering = Some(false);
        let cost = evaluate(&brick, SqFt(100.0), 9.0, 0.375, Some(FinishType::Plastered), &settings());
        assert_eq!(cost, 9560);
    }

    #[test]
    fn test_consumable_cost_units() {
        let quantities = CalculationResult {
            cement_qty: 3,
            sand_qty: 871,
            ..Default::default()
        };

        let cement_bag = consumable("c", MaterialType::Cement, "bag", 420.0);
        assert_eq!(consumable_cost(&cement_bag, MaterialRole::Cement, &quantities, &settings()), 1260);

        let cement_kg = consumable("c", MaterialType::Cement, "kg", 8.0);
        assert_eq!(consumable_cost(&cement_kg, MaterialRole::Cement, &quantities, &settings()), 1200);

        let sand_kg = consumable("s", MaterialType::Sand, "kg", 2.0);
        assert_eq!(consumable_cost(&sand_kg, MaterialRole::Sand, &quantities, &settings()), 1742);

        let sand_tonne = consumable("s", MaterialType::Sand, "tonne", 1000.0);
        assert_eq!(consumable_cost(&sand_tonne, MaterialRole::Sand, &quantities, &settings()), 871);
    }
}
