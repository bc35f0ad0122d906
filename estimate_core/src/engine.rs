//! # Estimate Session
//!
//! The single owner of mutable estimation state: inputs, catalog snapshot,
//! active selection, composition, finish preference and perspectives.
//! Every operation mutates the session and nothing else; derived outputs
//! come from [`EstimateSession::estimate`], which recomputes from scratch.
//!
//! External collaborators are injected as capability objects:
//!
//! - [`CompositionDetector`] for floor-plan based composition detection
//! - [`PerspectiveGenerator`] for alternative material bundles
//!
//! Callers must not start a second composition resolution while one is
//! pending; `&mut self` on the async methods enforces this within one
//! owner.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::engine::EstimateSession;
//! use estimate_core::calculations::CalculationInputs;
//! use estimate_core::composition::WallComposition;
//! use estimate_core::tier::Tier;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut session = EstimateSession::new(CalculationInputs::for_tier(Tier::Standard));
//! session.update_catalog(Vec::new()).await;
//! session
//!     .resolve_composition(Some(WallComposition::new(60.0, 30.0, 10.0)))
//!     .await
//!     .unwrap();
//!
//! let estimate = session.estimate();
//! assert_eq!(estimate.quantities.load_bearing_qty, 0); // empty catalog
//! # });
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculations::{recompute, CalculationInputs, Estimate, RoleMaterials};
use crate::composition::{self, CompositionDetector, ResolvedComposition, WallComposition};
use crate::dimensions::is_three_inch_profile;
use crate::errors::{CalcResult, EstimateError};
use crate::materials::{find, FinishType, Material, MaterialRole};
use crate::perspective::{self, Perspective, PerspectiveGenerator, SelectionDelta};
use crate::selection::{select_defaults, Selection, AAC_PARTITION_THICKNESS_IN};
use crate::settings::EstimateSettings;
use crate::tier::Tier;

/// Mutable estimation state with a single logical owner.
pub struct EstimateSession {
    id: Uuid,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    settings: EstimateSettings,
    inputs: CalculationInputs,
    catalog: Vec<Material>,
    selection: Selection,
    composition: ResolvedComposition,
    finish: Option<FinishType>,
    perspectives: Vec<Perspective>,
    selected_perspective_id: Option<String>,
    /// Set once the generator has been asked automatically
    generation_requested: bool,
    detector: Option<Arc<dyn CompositionDetector>>,
    generator: Option<Arc<dyn PerspectiveGenerator>>,
}

impl EstimateSession {
    pub fn new(inputs: CalculationInputs) -> Self {
        let now = Utc::now();
        EstimateSession {
            id: Uuid::new_v4(),
            created: now,
            modified: now,
            settings: EstimateSettings::default(),
            inputs,
            catalog: Vec::new(),
            selection: Selection::default(),
            composition: ResolvedComposition::default(),
            finish: None,
            perspectives: Vec::new(),
            selected_perspective_id: None,
            generation_requested: false,
            detector: None,
            generator: None,
        }
    }

    pub fn with_settings(mut self, settings: EstimateSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_detector(mut self, detector: Arc<dyn CompositionDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_perspective_generator(mut self, generator: Arc<dyn PerspectiveGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    pub fn settings(&self) -> &EstimateSettings {
        &self.settings
    }

    pub fn inputs(&self) -> &CalculationInputs {
        &self.inputs
    }

    pub fn catalog(&self) -> &[Material] {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn composition(&self) -> &ResolvedComposition {
        &self.composition
    }

    pub fn finish(&self) -> Option<FinishType> {
        self.finish
    }

    pub fn perspectives(&self) -> &[Perspective] {
        &self.perspectives
    }

    pub fn selected_perspective_id(&self) -> Option<&str> {
        self.selected_perspective_id.as_deref()
    }

    /// Catalog entry currently selected for a role
    pub fn selected_material(&self, role: MaterialRole) -> Option<&Material> {
        self.selection
            .material_id(role)
            .and_then(|id| find(&self.catalog, id))
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    /// Mutable access to dimensions and other inputs
    pub fn inputs_mut(&mut self) -> &mut CalculationInputs {
        self.touch();
        &mut self.inputs
    }

    pub fn set_tier(&mut self, tier: Tier) {
        self.inputs.tier = tier;
        self.touch();
    }

    pub fn set_finish(&mut self, finish: Option<FinishType>) {
        self.finish = finish;
        self.touch();
    }

    /// Replace the catalog snapshot from the live feed.
    ///
    /// Fills defaults for roles that have none yet (already-set roles are
    /// untouched, so repeated feed events are harmless). The first time the
    /// catalog is non-empty with no perspectives, the generator (if any) is
    /// asked once and its first perspective is applied. Generator failures
    /// are logged and leave the defaults in place; the generator is not
    /// asked again automatically.
    pub async fn update_catalog(&mut self, materials: Vec<Material>) {
        self.catalog = materials;
        self.touch();

        let picks = select_defaults(&self.catalog, self.inputs.tier);
        let filled = self.selection.fill_defaults(&picks);
        if filled.contains(&MaterialRole::Partition) {
            if let Some(thickness) = picks.partition_thickness_in {
                self.inputs.partition_wall_thickness_in = thickness;
            }
        }
        if !filled.is_empty() {
            info!(session = %self.id, roles = ?filled, "filled default materials");
        }

        if self.catalog.is_empty() || !self.perspectives.is_empty() || self.generation_requested {
            return;
        }
        let Some(generator) = self.generator.clone() else {
            return;
        };
        self.generation_requested = true;

        match generator
            .generate(self.inputs.tier, self.inputs.total_area_sqft, &self.catalog)
            .await
        {
            Ok(perspectives) => {
                info!(session = %self.id, count = perspectives.len(), "received perspectives");
                self.perspectives = perspectives;
                if let Some(first) = self.perspectives.first().cloned() {
                    self.apply_perspective_value(&first);
                }
            }
            Err(e) => warn!(session = %self.id, error = %e, "perspective generation failed"),
        }
    }

    /// Resolve the wall composition and adopt its opening percentage.
    ///
    /// When no source applies nothing changes, including any opening
    /// deduction set through [`Self::inputs_mut`]. On failure the previous
    /// composition is kept and the recoverable error is returned for the
    /// caller to surface; there is no automatic retry.
    pub async fn resolve_composition(
        &mut self,
        supplied: Option<WallComposition>,
    ) -> CalcResult<&ResolvedComposition> {
        let resolved = composition::try_resolve(
            supplied.as_ref(),
            &self.inputs.rooms,
            self.inputs.total_area_sqft,
            self.detector.as_deref(),
            &self.settings,
        )
        .await;

        match resolved {
            Ok(None) => Ok(&self.composition),
            Ok(Some(resolved)) => {
                self.inputs.opening_deduction_percent = resolved.opening_percent;
                info!(
                    session = %self.id,
                    source = ?resolved.source,
                    main_ratio = resolved.main_ratio,
                    partition_ratio = resolved.partition_ratio,
                    "wall composition resolved"
                );
                self.composition = resolved;
                self.touch();
                Ok(&self.composition)
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "wall composition resolution failed");
                Err(e)
            }
        }
    }

    /// Explicit user choice for a role.
    ///
    /// Clears AI provenance for that role only and clears the active
    /// perspective id.
    pub fn select_manual(&mut self, role: MaterialRole, material_id: &str) -> CalcResult<()> {
        let material = find(&self.catalog, material_id)
            .ok_or_else(|| EstimateError::material_not_found(material_id))?;
        if !role.matches(material) {
            return Err(EstimateError::invalid_input(
                "material_id",
                material_id,
                format!("material cannot fill role {}", role),
            ));
        }
        if role == MaterialRole::Partition && is_three_inch_profile(material.dimensions.as_deref()) {
            self.inputs.partition_wall_thickness_in = AAC_PARTITION_THICKNESS_IN;
        }

        self.selection.select_manual(role, material_id);
        self.selected_perspective_id = None;
        self.touch();
        Ok(())
    }

    /// Apply a stored perspective by id.
    pub fn apply_perspective(&mut self, perspective_id: &str) -> CalcResult<SelectionDelta> {
        let perspective = self
            .perspectives
            .iter()
            .find(|p| p.id == perspective_id)
            .cloned()
            .ok_or_else(|| {
                EstimateError::invalid_input("perspective_id", perspective_id, "unknown perspective")
            })?;
        Ok(self.apply_perspective_value(&perspective))
    }

    /// Replace the stored perspectives (e.g. after a manual regeneration)
    pub fn set_perspectives(&mut self, perspectives: Vec<Perspective>) {
        self.perspectives = perspectives;
        self.touch();
    }

    fn apply_perspective_value(&mut self, perspective: &Perspective) -> SelectionDelta {
        let delta = perspective::plan(perspective, &self.catalog);
        delta.apply_to(&mut self.selection);
        if let Some(thickness) = delta.partition_thickness_in {
            self.inputs.partition_wall_thickness_in = thickness;
        }
        self.finish = delta.finish;
        self.selected_perspective_id = Some(perspective.id.clone());
        self.touch();
        info!(session = %self.id, perspective = %perspective.id, roles = delta.changes.len(), "applied perspective");
        delta
    }

    // ------------------------------------------------------------------
    // Derived outputs
    // ------------------------------------------------------------------

    fn role_materials(&self) -> RoleMaterials<'_> {
        RoleMaterials {
            load_bearing: self.selected_material(MaterialRole::LoadBearing),
            partition: self.selected_material(MaterialRole::Partition),
            cement: self.selected_material(MaterialRole::Cement),
            sand: self.selected_material(MaterialRole::Sand),
        }
    }

    /// Roles with no catalog material behind the active selection
    pub fn missing_roles(&self) -> Vec<MaterialRole> {
        MaterialRole::ALL
            .into_iter()
            .filter(|role| self.selected_material(*role).is_none())
            .collect()
    }

    /// A `MissingMaterial` notice per role in [`Self::missing_roles`].
    ///
    /// These are reports, not failures: the estimate still computes with
    /// zero for each missing role.
    pub fn missing_materials(&self) -> Vec<EstimateError> {
        self.missing_roles()
            .into_iter()
            .map(|role| EstimateError::missing_material(role.display_name()))
            .collect()
    }

    /// Quantities, costs and budget checks for the current state
    pub fn estimate(&self) -> Estimate {
        recompute(
            &self.inputs,
            &self.role_materials(),
            &self.composition,
            self.finish,
            &self.settings,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::stubs::FixedDetector;
    use crate::composition::{CompositionSource, Room};
    use crate::materials::fixtures::{consumable, wall};
    use crate::materials::{MaterialType, WallSubCategory};
    use crate::perspective::stubs::FixedGenerator;
    use crate::selection::Provenance;

    fn catalog() -> Vec<Material> {
        let mut aac = wall("aac", WallSubCategory::Partition, "24x3x8", 55.0);
        aac.name = "AAC Block".to_string();
        vec![
            wall("lb-cheap", WallSubCategory::LoadBearing, "9x4x3", 8.0),
            wall("lb-dear", WallSubCategory::LoadBearing, "9x4x3", 50.0),
            wall("p-brick", WallSubCategory::Partition, "9x4x3", 7.0),
            aac,
            consumable("c1", MaterialType::Cement, "bag", 400.0),
            consumable("s1", MaterialType::Sand, "kg", 1.5),
        ]
    }

    fn perspective() -> Perspective {
        Perspective {
            id: "p-1".to_string(),
            load_bearing_id: Some("lb-dear".to_string()),
            partition_id: Some("p-brick".to_string()),
            cement_id: None,
            sand_id: None,
            finish_type: Some(FinishType::Plastered),
            reasoning: "Premium facade".to_string(),
        }
    }

    fn inputs(tier: Tier) -> CalculationInputs {
        let mut inputs = CalculationInputs::for_tier(tier);
        inputs.total_area_sqft = 1200.0;
        inputs.rooms = vec![
            Room::new(12.0, 10.0).with_metadata(0.6, 0.4).with_opening(10.0),
            Room::new(14.0, 12.0).with_metadata(0.6, 0.4).with_opening(10.0),
        ];
        inputs
    }

    #[tokio::test]
    async fn test_defaults_and_idempotent_catalog_feed() {
        let mut session = EstimateSession::new(inputs(Tier::Economy));
        session.update_catalog(catalog()).await;

        assert_eq!(session.selection().material_id(MaterialRole::LoadBearing), Some("lb-cheap"));
        assert_eq!(session.selection().material_id(MaterialRole::Partition), Some("aac"));
        assert_eq!(session.inputs().partition_wall_thickness_in, 3.0);

        session.select_manual(MaterialRole::LoadBearing, "lb-dear").unwrap();
        let before = session.selection().clone();
        session.update_catalog(catalog()).await;
        assert_eq!(session.selection(), &before);
    }

    #[tokio::test]
    async fn test_perspective_then_manual_override() {
        let generator = Arc::new(FixedGenerator::ok(vec![perspective()]));
        let mut session =
            EstimateSession::new(inputs(Tier::Standard)).with_perspective_generator(generator.clone());

        session.update_catalog(catalog()).await;
        assert_eq!(generator.call_count(), 1);
        assert_eq!(session.selected_perspective_id(), Some("p-1"));
        assert_eq!(session.selection().provenance(MaterialRole::LoadBearing), Provenance::Ai);
        assert_eq!(session.selection().provenance(MaterialRole::Cement), Provenance::Manual);
        assert_eq!(session.finish(), Some(FinishType::Plastered));

        session.select_manual(MaterialRole::LoadBearing, "lb-cheap").unwrap();
        assert_eq!(session.selection().provenance(MaterialRole::LoadBearing), Provenance::Manual);
        assert_eq!(session.selection().provenance(MaterialRole::Partition), Provenance::Ai);
        assert_eq!(session.selected_perspective_id(), None);

        // feed fires again: generator is not asked twice
        session.update_catalog(catalog()).await;
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generator_failure_keeps_defaults() {
        let generator = Arc::new(FixedGenerator::failing());
        let mut session =
            EstimateSession::new(inputs(Tier::Luxury)).with_perspective_generator(generator.clone());
        session.update_catalog(catalog()).await;

        assert_eq!(session.selection().material_id(MaterialRole::LoadBearing), Some("lb-dear"));
        assert!(session.perspectives().is_empty());
        assert_eq!(session.selected_perspective_id(), None);

        session.update_catalog(catalog()).await;
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_detector_failure_leaves_composition() {
        let detector = Arc::new(FixedDetector::ok(WallComposition::new(0.0, 0.0, 0.0)));
        let mut session = EstimateSession::new(inputs(Tier::Standard)).with_detector(detector.clone());

        let err = session.resolve_composition(None).await.unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(detector.call_count(), 1);
        assert!(!session.composition().detected);
        assert_eq!(session.composition().source, CompositionSource::Unresolved);
    }

    #[tokio::test]
    async fn test_supplied_composition_skips_detector() {
        let detector = Arc::new(FixedDetector::ok(WallComposition::new(10.0, 10.0, 0.0)));
        let mut session = EstimateSession::new(inputs(Tier::Standard)).with_detector(detector.clone());

        let resolved = session
            .resolve_composition(Some(WallComposition::new(70.0, 30.0, 12.0)))
            .await
            .unwrap();
        assert_eq!(resolved.source, CompositionSource::Supplied);
        assert_eq!(detector.call_count(), 0);
        assert_eq!(session.inputs().opening_deduction_percent, 12.0);
    }

    #[tokio::test]
    async fn test_unresolvable_composition_keeps_manual_opening() {
        let mut session = EstimateSession::new(CalculationInputs::for_tier(Tier::Standard));
        session
            .resolve_composition(Some(WallComposition::new(60.0, 30.0, 10.0)))
            .await
            .unwrap();
        session.inputs_mut().opening_deduction_percent = 25.0;

        // no rooms, no area, nothing supplied
        let kept = session.resolve_composition(None).await.unwrap();
        assert_eq!(kept.source, CompositionSource::Supplied);
        assert_eq!(kept.main_ratio, 0.6);
        assert_eq!(session.inputs().opening_deduction_percent, 25.0);
    }

    #[tokio::test]
    async fn test_perspective_without_finish_clears_finish() {
        let mut session = EstimateSession::new(inputs(Tier::Standard));
        session.update_catalog(catalog()).await;
        session.set_finish(Some(FinishType::Exposed));

        let mut bare = perspective();
        bare.id = "p-2".to_string();
        bare.finish_type = None;
        session.set_perspectives(vec![perspective(), bare]);

        session.apply_perspective("p-1").unwrap();
        assert_eq!(session.finish(), Some(FinishType::Plastered));
        session.apply_perspective("p-2").unwrap();
        assert_eq!(session.finish(), None);
        assert_eq!(session.selected_perspective_id(), Some("p-2"));
    }

    #[tokio::test]
    async fn test_estimate_recomputes_after_changes() {
        let mut session = EstimateSession::new(inputs(Tier::Standard));
        session.update_catalog(catalog()).await;
        session.resolve_composition(None).await.unwrap();
        assert_eq!(session.composition().source, CompositionSource::RoomAverage);

        let first = session.estimate();
        assert!(first.quantities.load_bearing_qty > 0);
        assert!(first.quantities.partition_qty > 0);
        // Standard picks the 50-priced brick: 50 > 2 x 18
        assert!(first.budget.load_bearing.violated);
        assert_eq!(first.budget.load_bearing.difference, 32_000);

        session.inputs_mut().height_ft = 20.0;
        let taller = session.estimate();
        assert!(taller.quantities.load_bearing_qty > first.quantities.load_bearing_qty);
        assert!(taller.costs.total > first.costs.total);

        session.select_manual(MaterialRole::LoadBearing, "lb-cheap").unwrap();
        let cheaper = session.estimate();
        assert!(!cheaper.budget.load_bearing.violated);
        assert!(cheaper.costs.load_bearing < taller.costs.load_bearing);
    }

    #[tokio::test]
    async fn test_select_manual_rejects_unknown_or_wrong_role() {
        let mut session = EstimateSession::new(inputs(Tier::Standard));
        session.update_catalog(catalog()).await;

        let err = session.select_manual(MaterialRole::Cement, "nope").unwrap_err();
        assert_eq!(err.error_code(), "MATERIAL_NOT_FOUND");

        let err = session.select_manual(MaterialRole::Cement, "lb-cheap").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_missing_roles_degrade_to_zero() {
        let mut session = EstimateSession::new(inputs(Tier::Standard));
        session
            .update_catalog(vec![wall("lb", WallSubCategory::LoadBearing, "9x4x3", 10.0)])
            .await;
        session.resolve_composition(None).await.unwrap();

        assert_eq!(
            session.missing_roles(),
            vec![MaterialRole::Partition, MaterialRole::Cement, MaterialRole::Sand]
        );
        let notices = session.missing_materials();
        assert_eq!(notices.len(), 3);
        assert!(notices.iter().all(|e| e.error_code() == "MISSING_MATERIAL"));
        assert_eq!(notices[0], EstimateError::missing_material("Partition wall"));

        let estimate = session.estimate();
        assert!(estimate.quantities.load_bearing_qty > 0);
        assert_eq!(estimate.quantities.partition_qty, 0);
        assert_eq!(estimate.costs.cement, 0);
        assert_eq!(estimate.costs.sand, 0);
    }
}
