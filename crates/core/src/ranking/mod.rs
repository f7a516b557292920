//! Product ranking and result composition.
//!
//! Two composers share the same building blocks:
//!
//! - [`discount::pick_home_discounts`] picks the homepage discount strip:
//!   pinned representatives first, then auto-eligible representatives
//!   interleaved across categories.
//! - [`listing::compose_listing`] builds a search/category page: products are
//!   bucketed by query match and category, emitted in relevance stages, then
//!   filtered by price and re-sorted without breaking the stages.
//!
//! Everything here is pure and synchronous. Callers fetch the candidate
//! snapshot and pass explicit configuration in.

pub mod buckets;
pub mod candidate;
pub mod comparator;
pub mod discount;
pub mod interleave;
pub mod listing;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use buckets::OrderedBuckets;
pub use candidate::{DiscountCandidate, ListingProduct, ListingVariant};
pub use comparator::{compare, compare_pinned, prefer};
pub use discount::{pick_home_discounts, representatives};
pub use interleave::RoundRobin;
pub use listing::{ComposedListing, GeneratedListing, ListingQuery, RankedProduct, compose_listing};

/// Default number of cards in the homepage discount strip, also its hard max.
pub const DEFAULT_DISCOUNT_LIMIT: usize = 12;

/// Default number of products a generated listing may hold.
pub const DEFAULT_LISTING_PAGE_CAP: usize = 50;

/// Configuration for the homepage discount composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountPickerConfig {
    /// Maximum number of cards returned.
    pub page_limit: usize,
    /// Maximum auto-picked cards per category.
    pub per_category_cap: usize,
    /// Minimum discount percentage for auto-eligibility.
    pub auto_min_percent: Decimal,
    /// Discount percentage at which a card gets the "fire" badge.
    pub fire_min_percent: Decimal,
}

impl Default for DiscountPickerConfig {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_DISCOUNT_LIMIT,
            per_category_cap: 2,
            auto_min_percent: Decimal::from(10),
            fire_min_percent: Decimal::from(40),
        }
    }
}

impl DiscountPickerConfig {
    /// Resolve a requested card count against the configured limit.
    ///
    /// Missing or zero requests use the limit; larger requests are clamped.
    #[must_use]
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) if n > 0 => n.min(self.page_limit),
            _ => self.page_limit,
        }
    }

    /// Whether a discount earns the "fire" badge.
    #[must_use]
    pub fn is_hot(&self, discount_percent: Decimal) -> bool {
        discount_percent >= self.fire_min_percent
    }
}

/// Configuration for the search/listing composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Maximum number of products the generator emits.
    pub page_cap: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_cap: DEFAULT_LISTING_PAGE_CAP,
        }
    }
}
