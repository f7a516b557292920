//! Price ranges and price envelopes using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An inclusive price range where either bound may be absent.
///
/// An absent bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    /// Inclusive lower bound.
    pub min: Option<Decimal>,
    /// Inclusive upper bound.
    pub max: Option<Decimal>,
}

impl PriceRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self { min, max }
    }

    /// A range with neither bound set.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Whether neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether `price` lies inside the range, bounds included.
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

/// Minimum and maximum price over a set of products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceStats {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceStats {
    /// Build stats from an iterator of prices.
    ///
    /// An empty iterator yields `{0, 0}`. The maximum is never below the minimum.
    pub fn from_prices(prices: impl IntoIterator<Item = Decimal>) -> Self {
        let mut min: Option<Decimal> = None;
        let mut max = Decimal::ZERO;

        for price in prices {
            min = Some(min.map_or(price, |m| m.min(price)));
            if price > max {
                max = price;
            }
        }

        let min = min.unwrap_or(Decimal::ZERO);
        Self {
            min,
            max: max.max(min),
        }
    }
}
