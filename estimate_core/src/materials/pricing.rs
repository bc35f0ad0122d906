//! Pricing units declared by catalog entries.
//!
//! Cement quantities come out of the calculator as bags and sand as
//! kilograms, but the catalog may price either per bag, kg, tonne, cubic
//! foot or cubic meter. [`PricingUnit::units_for_mass`] converts before the
//! price is applied.

use serde::{Deserialize, Serialize};

use crate::units::{CubicMeters, CuFt, Kilograms};

/// Parsed form of a catalog `unit` label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingUnit {
    Piece,
    Bag,
    Kilogram,
    Tonne,
    CubicFoot,
    CubicMeter,
    Unknown,
}

impl PricingUnit {
    pub fn parse(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "piece" | "pieces" | "pc" | "pcs" | "nos" | "no" | "unit" | "units" | "brick"
            | "bricks" | "block" | "blocks" => PricingUnit::Piece,
            "bag" | "bags" | "50kg bag" | "50 kg bag" => PricingUnit::Bag,
            "kg" | "kgs" | "kilogram" | "kilograms" => PricingUnit::Kilogram,
            "t" | "ton" | "tons" | "tonne" | "tonnes" | "mt" => PricingUnit::Tonne,
            "cft" | "cu ft" | "cu.ft" | "ft3" | "cubic foot" | "cubic feet" => PricingUnit::CubicFoot,
            "m3" | "cum" | "cu m" | "cubic meter" | "cubic metre" => PricingUnit::CubicMeter,
            _ => PricingUnit::Unknown,
        }
    }

    /// Number of priced units covering `mass`.
    ///
    /// `natural_count` is what the calculator already reports for the role
    /// (bags for cement, kilograms for sand) and is used as-is for count
    /// units and unknown labels.
    pub fn units_for_mass(
        &self,
        mass: Kilograms,
        natural_count: f64,
        density_kg_m3: f64,
        bag_kg: f64,
    ) -> f64 {
        let volume = if density_kg_m3 > 0.0 {
            CubicMeters(mass.0 / density_kg_m3)
        } else {
            CubicMeters(0.0)
        };
        match self {
            PricingUnit::Piece | PricingUnit::Unknown => natural_count,
            PricingUnit::Bag if bag_kg > 0.0 => mass.0 / bag_kg,
            PricingUnit::Bag => natural_count,
            PricingUnit::Kilogram => mass.0,
            PricingUnit::Tonne => mass.0 / 1000.0,
            PricingUnit::CubicFoot => CuFt::from(volume).0,
            PricingUnit::CubicMeter => volume.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!(PricingUnit::parse("Bag"), PricingUnit::Bag);
        assert_eq!(PricingUnit::parse(" kg "), PricingUnit::Kilogram);
        assert_eq!(PricingUnit::parse("CFT"), PricingUnit::CubicFoot);
        assert_eq!(PricingUnit::parse("tonne"), PricingUnit::Tonne);
        assert_eq!(PricingUnit::parse("truckload"), PricingUnit::Unknown);
    }

    #[test]
    fn test_sand_priced_per_tonne() {
        let units = PricingUnit::Tonne.units_for_mass(Kilograms(2500.0), 2500.0, 1600.0, 50.0);
        assert!((units - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_sand_priced_per_cubic_meter() {
        let units = PricingUnit::CubicMeter.units_for_mass(Kilograms(800.0), 800.0, 1600.0, 50.0);
        assert!((units - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_uses_natural_count() {
        let units = PricingUnit::Unknown.units_for_mass(Kilograms(150.0), 3.0, 1440.0, 50.0);
        assert_eq!(units, 3.0);
    }
}
