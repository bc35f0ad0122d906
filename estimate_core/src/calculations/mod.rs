//! # Estimate Calculations
//!
//! Pure functions from the current state to quantities and costs. Nothing
//! here caches: [`recompute`] derives a fresh [`Estimate`] every call, and
//! the host calls it after any change to dimensions, composition, selection
//! or tier.
//!
//! - [`quantities`] - running length, face areas, unit counts, mortar
//! - [`cost`] - system costs and budget checks

pub mod cost;
pub mod quantities;

use serde::{Deserialize, Serialize};

use crate::composition::ResolvedComposition;
use crate::materials::{FinishType, Material, MaterialRole};
use crate::settings::EstimateSettings;

// Re-export commonly used types
pub use cost::{BudgetViolation, BudgetViolations, SystemCosts};
pub use quantities::{compute_quantities, CalculationInputs, CalculationResult};

/// Materials resolved for each role of the active selection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoleMaterials<'a> {
    pub load_bearing: Option<&'a Material>,
    pub partition: Option<&'a Material>,
    pub cement: Option<&'a Material>,
    pub sand: Option<&'a Material>,
}

impl<'a> RoleMaterials<'a> {
    pub fn get(&self, role: MaterialRole) -> Option<&'a Material> {
        match role {
            MaterialRole::LoadBearing => self.load_bearing,
            MaterialRole::Partition => self.partition,
            MaterialRole::Cement => self.cement,
            MaterialRole::Sand => self.sand,
        }
    }
}

/// Everything derived from the current state.
///
/// ## JSON Example
///
/// ```json
/// {
///   "quantities": { "load_bearing_qty": 2524, "partition_qty": 841, "cement_qty": 10, "sand_qty": 3187, ... },
///   "costs": { "load_bearing": 25240, "partition": 6728, "cement": 4200, "sand": 6374, "total": 42542 },
///   "budget": { "load_bearing": { "violated": false, "difference": 0 }, "partition": { ... } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Estimate {
    pub quantities: CalculationResult,
    pub costs: SystemCosts,
    pub budget: BudgetViolations,
}

/// Derive quantities, costs and budget checks from the current state.
pub fn recompute(
    inputs: &CalculationInputs,
    materials: &RoleMaterials<'_>,
    composition: &ResolvedComposition,
    finish: Option<FinishType>,
    settings: &EstimateSettings,
) -> Estimate {
    let quantities = compute_quantities(
        inputs,
        materials.load_bearing,
        materials.partition,
        composition,
        settings,
    );
    let costs = cost::system_costs(inputs, materials, &quantities, finish, settings);
    let budget = cost::budget_violations(materials, inputs.tier);

    Estimate {
        quantities,
        costs,
        budget,
    }
}
