//! # Material Selection
//!
//! Default material per role and the provenance of each active choice.
//!
//! ## Default ranking
//!
//! Candidates for a role are ranked by `pricePerUnit`: ascending for
//! Economy (cheapest wins), descending for Standard and Luxury (priciest is
//! presumed better). Ties keep catalog order. Economy partitions first look
//! for a 3 in AAC block.
//!
//! ## Provenance
//!
//! ```text
//! Unset --default--> Manual <--perspective/manual pick--> Ai
//! ```

use serde::{Deserialize, Serialize};

use crate::dimensions::is_three_inch_profile;
use crate::materials::{candidates, Material, MaterialRole};
use crate::tier::Tier;

/// Thickness of an AAC partition block (in)
pub const AAC_PARTITION_THICKNESS_IN: f64 = 3.0;

/// Where the active selection for a role came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Provenance {
    #[default]
    Unset,
    Manual,
    Ai,
}

/// Active material for one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RoleSelection {
    pub material_id: Option<String>,
    pub provenance: Provenance,
}

/// Result of ranking a catalog for every role
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DefaultPicks<'a> {
    pub load_bearing: Option<&'a Material>,
    pub partition: Option<&'a Material>,
    pub cement: Option<&'a Material>,
    pub sand: Option<&'a Material>,
    /// Set when the partition pick is a thin AAC block
    pub partition_thickness_in: Option<f64>,
}

impl<'a> DefaultPicks<'a> {
    pub fn get(&self, role: MaterialRole) -> Option<&'a Material> {
        match role {
            MaterialRole::LoadBearing => self.load_bearing,
            MaterialRole::Partition => self.partition,
            MaterialRole::Cement => self.cement,
            MaterialRole::Sand => self.sand,
        }
    }
}

fn is_aac_partition(material: &Material) -> bool {
    material.name.to_lowercase().contains("aac") && is_three_inch_profile(material.dimensions.as_deref())
}

/// Best candidate for a role under the tier's ranking rule
pub fn rank_candidate<'a>(materials: &'a [Material], role: MaterialRole, tier: Tier) -> Option<&'a Material> {
    let mut pool = candidates(materials, role);
    pool.sort_by(|a, b| {
        let ord = a
            .price_per_unit
            .partial_cmp(&b.price_per_unit)
            .unwrap_or(std::cmp::Ordering::Equal);
        if tier.prefers_cheapest() {
            ord
        } else {
            ord.reverse()
        }
    });
    pool.first().copied()
}

/// Pick a default material for every role.
pub fn select_defaults(materials: &[Material], tier: Tier) -> DefaultPicks<'_> {
    let mut picks = DefaultPicks {
        load_bearing: rank_candidate(materials, MaterialRole::LoadBearing, tier),
        partition: None,
        cement: rank_candidate(materials, MaterialRole::Cement, tier),
        sand: rank_candidate(materials, MaterialRole::Sand, tier),
        partition_thickness_in: None,
    };

    let aac = if tier == Tier::Economy {
        candidates(materials, MaterialRole::Partition)
            .into_iter()
            .find(|m| is_aac_partition(m))
    } else {
        None
    };

    match aac {
        Some(block) => {
            picks.partition = Some(block);
            picks.partition_thickness_in = Some(AAC_PARTITION_THICKNESS_IN);
        }
        None => picks.partition = rank_candidate(materials, MaterialRole::Partition, tier),
    }

    picks
}

/// Active selection for all four roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Selection {
    pub load_bearing: RoleSelection,
    pub partition: RoleSelection,
    pub cement: RoleSelection,
    pub sand: RoleSelection,
}

impl Selection {
    pub fn role(&self, role: MaterialRole) -> &RoleSelection {
        match role {
            MaterialRole::LoadBearing => &self.load_bearing,
            MaterialRole::Partition => &self.partition,
            MaterialRole::Cement => &self.cement,
            MaterialRole::Sand => &self.sand,
        }
    }

    pub fn role_mut(&mut self, role: MaterialRole) -> &mut RoleSelection {
        match role {
            MaterialRole::LoadBearing => &mut self.load_bearing,
            MaterialRole::Partition => &mut self.partition,
            MaterialRole::Cement => &mut self.cement,
            MaterialRole::Sand => &mut self.sand,
        }
    }

    pub fn material_id(&self, role: MaterialRole) -> Option<&str> {
        self.role(role).material_id.as_deref()
    }

    pub fn provenance(&self, role: MaterialRole) -> Provenance {
        self.role(role).provenance
    }

    /// Fill roles that have no material yet. Already-set roles are left
    /// untouched, so re-applying the same picks is a no-op.
    ///
    /// Returns the roles that were filled.
    pub fn fill_defaults(&mut self, picks: &DefaultPicks<'_>) -> Vec<MaterialRole> {
        let mut filled = Vec::new();
        for role in MaterialRole::ALL {
            let slot = self.role_mut(role);
            if slot.material_id.is_some() {
                continue;
            }
            if let Some(material) = picks.get(role) {
                slot.material_id = Some(material.id.clone());
                slot.provenance = Provenance::Manual;
                filled.push(role);
            }
        }
        filled
    }

    /// Record an explicit user choice for a role
    pub fn select_manual(&mut self, role: MaterialRole, material_id: impl Into<String>) {
        let slot = self.role_mut(role);
        slot.material_id = Some(material_id.into());
        slot.provenance = Provenance::Manual;
    }

    /// Record a choice made by an applied perspective
    pub fn select_ai(&mut self, role: MaterialRole, material_id: impl Into<String>) {
        let slot = self.role_mut(role);
        slot.material_id = Some(material_id.into());
        slot.provenance = Provenance::Ai;
    }
}
