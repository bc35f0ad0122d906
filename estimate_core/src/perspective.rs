//! # Perspectives
//!
//! A perspective is an externally generated bundle of material choices with
//! a rationale. Applying one switches the active selection for every role
//! it names (ids missing from the catalog are skipped) and marks those
//! roles as AI-sourced. Composition is never re-derived.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dimensions::is_three_inch_profile;
use crate::errors::CalcResult;
use crate::materials::{find, FinishType, Material, MaterialRole};
use crate::selection::{Selection, AAC_PARTITION_THICKNESS_IN};
use crate::tier::Tier;

/// Alternative material bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perspective {
    pub id: String,
    #[serde(default)]
    pub load_bearing_id: Option<String>,
    #[serde(default)]
    pub partition_id: Option<String>,
    #[serde(default)]
    pub cement_id: Option<String>,
    #[serde(default)]
    pub sand_id: Option<String>,
    #[serde(default)]
    pub finish_type: Option<FinishType>,
    #[serde(default)]
    pub reasoning: String,
}

impl Perspective {
    pub fn material_id(&self, role: MaterialRole) -> Option<&str> {
        match role {
            MaterialRole::LoadBearing => self.load_bearing_id.as_deref(),
            MaterialRole::Partition => self.partition_id.as_deref(),
            MaterialRole::Cement => self.cement_id.as_deref(),
            MaterialRole::Sand => self.sand_id.as_deref(),
        }
    }
}

/// External generator of ranked perspectives
#[async_trait]
pub trait PerspectiveGenerator: Send + Sync {
    async fn generate(
        &self,
        tier: Tier,
        total_area_sqft: f64,
        materials: &[Material],
    ) -> CalcResult<Vec<Perspective>>;
}

/// Changes a perspective makes to the active state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionDelta {
    pub perspective_id: String,
    /// Roles whose material id was found in the catalog
    pub changes: Vec<(MaterialRole, String)>,
    /// Set when the new partition is a 3 in profile
    pub partition_thickness_in: Option<f64>,
    pub finish: Option<FinishType>,
}

impl SelectionDelta {
    pub fn changed_roles(&self) -> impl Iterator<Item = MaterialRole> + '_ {
        self.changes.iter().map(|(role, _)| *role)
    }

    /// Overwrite the selection for each changed role and mark it AI-sourced
    pub fn apply_to(&self, selection: &mut Selection) {
        for (role, id) in &self.changes {
            selection.select_ai(*role, id.clone());
        }
    }
}

/// Work out what applying `perspective` against `catalog` would change.
pub fn plan(perspective: &Perspective, catalog: &[Material]) -> SelectionDelta {
    let mut changes = Vec::new();
    let mut partition_thickness_in = None;

    for role in MaterialRole::ALL {
        let Some(id) = perspective.material_id(role) else {
            continue;
        };
        match find(catalog, id) {
            Some(material) => {
                if role == MaterialRole::Partition && is_three_inch_profile(material.dimensions.as_deref()) {
                    partition_thickness_in = Some(AAC_PARTITION_THICKNESS_IN);
                }
                changes.push((role, material.id.clone()));
            }
            None => debug!(perspective = %perspective.id, material_id = id, "perspective material not in catalog"),
        }
    }

    SelectionDelta {
        perspective_id: perspective.id.clone(),
        changes,
        partition_thickness_in,
        finish: perspective.finish_type,
    }
}

#[cfg(test)]
pub(crate) mod stubs {
    use super::*;
    use crate::errors::EstimateError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Generator returning a fixed list and counting calls
    pub struct FixedGenerator {
        pub response: CalcResult<Vec<Perspective>>,
        pub calls: AtomicUsize,
    }

    impl FixedGenerator {
        pub fn ok(perspectives: Vec<Perspective>) -> Self {
            FixedGenerator {
                response: Ok(perspectives),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            FixedGenerator {
                response: Err(EstimateError::perspective_failed("model offline")),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PerspectiveGenerator for FixedGenerator {
        async fn generate(
            &self,
            _tier: Tier,
            _total_area_sqft: f64,
            _materials: &[Material],
        ) -> CalcResult<Vec<Perspective>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::fixtures::{consumable, wall};
    use crate::materials::{MaterialType, WallSubCategory};
    use crate::selection::Provenance;

    fn catalog() -> Vec<Material> {
        vec![
            wall("lb-1", WallSubCategory::LoadBearing, "9x4x3", 10.0),
            wall("aac", WallSubCategory::Partition, "24x3x8", 55.0),
            consumable("c1", MaterialType::Cement, "bag", 400.0),
        ]
    }

    fn perspective() -> Perspective {
        Perspective {
            id: "p-1".to_string(),
            load_bearing_id: Some("lb-1".to_string()),
            partition_id: Some("aac".to_string()),
            cement_id: Some("c1".to_string()),
            sand_id: Some("gone".to_string()),
            finish_type: Some(FinishType::Exposed),
            reasoning: "Exposed brick keeps plaster off the bill".to_string(),
        }
    }

    #[test]
    fn test_plan_skips_absent_ids() {
        let delta = plan(&perspective(), &catalog());
        let roles: Vec<_> = delta.changed_roles().collect();
        assert_eq!(
            roles,
            vec![MaterialRole::LoadBearing, MaterialRole::Partition, MaterialRole::Cement]
        );
        assert_eq!(delta.partition_thickness_in, Some(3.0));
        assert_eq!(delta.finish, Some(FinishType::Exposed));
    }

    #[test]
    fn test_apply_marks_changed_roles_ai() {
        let mut selection = Selection::default();
        selection.select_manual(MaterialRole::Sand, "s-manual");

        plan(&perspective(), &catalog()).apply_to(&mut selection);

        assert_eq!(selection.provenance(MaterialRole::LoadBearing), Provenance::Ai);
        assert_eq!(selection.material_id(MaterialRole::Partition), Some("aac"));
        // sand id was missing from the catalog
        assert_eq!(selection.provenance(MaterialRole::Sand), Provenance::Manual);
        assert_eq!(selection.material_id(MaterialRole::Sand), Some("s-manual"));
    }

    #[test]
    fn test_perspective_json() {
        let json = r#"{
            "id": "p-9",
            "loadBearingId": "lb-1",
            "partitionId": null,
            "finishType": "Plastered",
            "reasoning": "Balanced"
        }"#;
        let p: Perspective = serde_json::from_str(json).unwrap();
        assert_eq!(p.material_id(MaterialRole::LoadBearing), Some("lb-1"));
        assert_eq!(p.material_id(MaterialRole::Partition), None);
        assert_eq!(p.finish_type, Some(FinishType::Plastered));
    }
}
