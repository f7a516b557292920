//! Listing sort modes.

use serde::{Deserialize, Serialize};

/// Sort order requested for a product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    /// Keep the ranking engine's order.
    #[default]
    Newest,
    /// Cheapest first inside each relevance stage.
    PriceAsc,
    /// Most expensive first inside each relevance stage.
    PriceDesc,
}

impl SortMode {
    /// Parse from a query parameter value. Unknown values fall back to `Newest`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "priceAsc" => Self::PriceAsc,
            "priceDesc" => Self::PriceDesc,
            _ => Self::Newest,
        }
    }

    /// Query parameter value, also the name passed to the listing procedure.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "priceAsc",
            Self::PriceDesc => "priceDesc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_known_values() {
        for mode in [SortMode::Newest, SortMode::PriceAsc, SortMode::PriceDesc] {
            assert_eq!(SortMode::parse(mode.as_str()), mode);
        }
    }

    #[test]
    fn test_parse_unknown_is_newest() {
        assert_eq!(SortMode::parse(""), SortMode::Newest);
        assert_eq!(SortMode::parse("price-ascending"), SortMode::Newest);
    }
}
