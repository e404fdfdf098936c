//! Price-tier rarity labels.
//!
//! Rarity is a display label derived from the cached price at read time;
//! it is never stored. Tier lower bounds are inclusive.

use serde::Serialize;

/// Rarity tier for a discovered property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    /// Price below 500,000 (or unknown).
    Common,
    /// Price at or above 500,000.
    Rare,
    /// Price at or above 1,000,000.
    Epic,
    /// Price at or above 2,000,000.
    Legendary,
}

impl Rarity {
    /// Derives the rarity tier from a price. A missing price is `Common`.
    pub fn from_price(price: Option<f64>) -> Self {
        match price {
            Some(p) if p >= 2_000_000.0 => Rarity::Legendary,
            Some(p) if p >= 1_000_000.0 => Rarity::Epic,
            Some(p) if p >= 500_000.0 => Rarity::Rare,
            _ => Rarity::Common,
        }
    }

    /// Returns the lowercase label used in API payloads and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_lower_bounds_inclusive() {
        assert_eq!(Rarity::from_price(Some(2_000_000.0)), Rarity::Legendary);
        assert_eq!(Rarity::from_price(Some(1_000_000.0)), Rarity::Epic);
        assert_eq!(Rarity::from_price(Some(500_000.0)), Rarity::Rare);
    }

    #[test]
    fn test_just_below_boundaries() {
        assert_eq!(Rarity::from_price(Some(1_999_999.0)), Rarity::Epic);
        assert_eq!(Rarity::from_price(Some(999_999.0)), Rarity::Rare);
        assert_eq!(Rarity::from_price(Some(499_999.0)), Rarity::Common);
    }

    #[test]
    fn test_missing_price_is_common() {
        assert_eq!(Rarity::from_price(None), Rarity::Common);
        assert_eq!(Rarity::from_price(Some(0.0)), Rarity::Common);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Rarity::Legendary.as_str(), "legendary");
        assert_eq!(Rarity::Epic.to_string(), "epic");
        assert_eq!(Rarity::Rare.as_str(), "rare");
        assert_eq!(Rarity::Common.to_string(), "common");
    }
}
