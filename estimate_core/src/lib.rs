//! # estimate_core - Wall Material Estimation Engine
//!
//! `estimate_core` turns a floor plan (total area and rooms), a materials
//! catalog and a quality tier into a wall material takeoff: brick/block
//! counts for load-bearing and partition walls, cement bags, sand mass,
//! system costs and budget warnings. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Pure calculations**: quantities and costs are recomputed from the
//!   current state on every call, never cached
//! - **Single owner**: [`engine::EstimateSession`] holds all mutable state
//! - **Injected collaborators**: composition detection and perspective
//!   generation are async capability traits
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use estimate_core::calculations::{compute_quantities, CalculationInputs};
//! use estimate_core::composition::ResolvedComposition;
//! use estimate_core::settings::EstimateSettings;
//! use estimate_core::tier::Tier;
//!
//! let mut inputs = CalculationInputs::for_tier(Tier::Economy);
//! inputs.total_area_sqft = 1200.0;
//!
//! // Nothing selected yet: the takeoff is all zeros
//! let result = compute_quantities(
//!     &inputs,
//!     None,
//!     None,
//!     &ResolvedComposition::default(),
//!     &EstimateSettings::default(),
//! );
//! assert_eq!(result.load_bearing_qty, 0);
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - Session state and the operations that mutate it
//! - [`calculations`] - Quantity takeoff, system cost and budget checks
//! - [`composition`] - Wall composition resolution
//! - [`selection`] - Default material ranking and provenance
//! - [`perspective`] - Alternative material bundles
//! - [`materials`] - Catalog entries and role predicates
//! - [`dimensions`] - Unit dimension parsing
//! - [`tier`] - Quality tiers and their budgets
//! - [`units`] - Type-safe unit wrappers
//! - [`settings`] - Tunable constants and settings files
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod composition;
pub mod dimensions;
pub mod engine;
pub mod errors;
pub mod materials;
pub mod perspective;
pub mod selection;
pub mod settings;
pub mod tier;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{recompute, CalculationInputs, CalculationResult, Estimate};
pub use engine::EstimateSession;
pub use errors::{CalcResult, EstimateError};
pub use materials::{Material, MaterialRole};
pub use settings::{load_settings, EstimateSettings};
pub use tier::Tier;
