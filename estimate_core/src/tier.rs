//! # Quality Tiers
//!
//! A tier drives two things: which way the material selector breaks price
//! ties, and the nominal per-unit budget each wall role is checked against.

use serde::{Deserialize, Serialize};

use crate::materials::MaterialRole;

/// Quality/budget class of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Tier {
    Economy,
    #[default]
    Standard,
    Luxury,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Economy, Tier::Standard, Tier::Luxury];

    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Economy => "Economy",
            Tier::Standard => "Standard",
            Tier::Luxury => "Luxury",
        }
    }

    /// Economy picks the cheapest candidate; higher tiers presume the
    /// priciest candidate is the better one.
    pub fn prefers_cheapest(&self) -> bool {
        matches!(self, Tier::Economy)
    }

    /// Nominal per-unit price for a wall role.
    ///
    /// Cement and sand are not budget-checked.
    pub fn budget(&self, role: MaterialRole) -> Option<f64> {
        let (load_bearing, partition) = match self {
            Tier::Economy => (12.0, 10.0),
            Tier::Standard => (18.0, 15.0),
            Tier::Luxury => (30.0, 25.0),
        };
        match role {
            MaterialRole::LoadBearing => Some(load_bearing),
            MaterialRole::Partition => Some(partition),
            MaterialRole::Cement | MaterialRole::Sand => None,
        }
    }

    /// Partition wall thickness in inches before any material is chosen.
    /// Economy assumes thin 3 in AAC partitions.
    pub fn default_partition_thickness_in(&self) -> f64 {
        match self {
            Tier::Economy => 3.0,
            Tier::Standard | Tier::Luxury => 4.5,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_table() {
        assert_eq!(Tier::Standard.budget(MaterialRole::LoadBearing), Some(18.0));
        assert_eq!(Tier::Economy.budget(MaterialRole::Partition), Some(10.0));
        assert_eq!(Tier::Luxury.budget(MaterialRole::Cement), None);
    }

    #[test]
    fn test_partition_thickness() {
        assert_eq!(Tier::Economy.default_partition_thickness_in(), 3.0);
        assert_eq!(Tier::Luxury.default_partition_thickness_in(), 4.5);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Tier::Luxury).unwrap();
        assert_eq!(json, "\"Luxury\"");
        let tier: Tier = serde_json::from_str("\"Economy\"").unwrap();
        assert_eq!(tier, Tier::Economy);
    }
}
