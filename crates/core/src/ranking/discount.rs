//! Homepage discount composer.
//!
//! Output is built in two tiers:
//!
//! 1. Pinned representatives (pinned, discount above zero), newest pin first.
//! 2. Auto-eligible representatives (not pinned, discount at or above the
//!    configured threshold) for products not already used by a pin, capped per
//!    category and interleaved round-robin across categories. Categories whose
//!    lead candidate is stronger are visited first.
//!
//! Only in-stock candidates take part in either tier.

use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::hash_map::Entry;

use rust_decimal::Decimal;

use super::DiscountPickerConfig;
use super::buckets::OrderedBuckets;
use super::candidate::DiscountCandidate;
use super::comparator::{compare, compare_pinned, prefer};
use super::interleave::RoundRobin;
use crate::types::{CategoryId, ProductId};

/// Pick one representative per product with the comparator.
///
/// Representatives keep the order in which their product was first seen.
pub fn representatives<'a, I>(candidates: I) -> Vec<&'a DiscountCandidate>
where
    I: IntoIterator<Item = &'a DiscountCandidate>,
{
    let mut slots: HashMap<ProductId, usize> = HashMap::new();
    let mut reps: Vec<&'a DiscountCandidate> = Vec::new();

    for candidate in candidates {
        match slots.entry(candidate.product_id) {
            Entry::Occupied(entry) => {
                if let Some(slot) = reps.get_mut(*entry.get()) {
                    *slot = prefer(slot, candidate);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(reps.len());
                reps.push(candidate);
            }
        }
    }

    reps
}

/// Compose the homepage discount strip.
///
/// `limit` is the resolved card count; it is clamped to `config.page_limit`.
#[must_use]
pub fn pick_home_discounts<'a>(
    candidates: &'a [DiscountCandidate],
    limit: usize,
    config: &DiscountPickerConfig,
) -> Vec<&'a DiscountCandidate> {
    let limit = limit.min(config.page_limit);
    if limit == 0 {
        return Vec::new();
    }

    let in_stock = || candidates.iter().filter(|c| c.effective_stock() > 0);

    let mut picked =
        representatives(in_stock().filter(|c| c.pinned && c.discount() > Decimal::ZERO));
    picked.sort_by(|a, b| compare_pinned(a, b));
    picked.truncate(limit);

    if picked.len() >= limit {
        return picked;
    }

    let used: HashSet<ProductId> = picked.iter().map(|c| c.product_id).collect();
    let auto = representatives(in_stock().filter(|c| {
        !c.pinned && !used.contains(&c.product_id) && c.discount() >= config.auto_min_percent
    }));

    let mut by_category: OrderedBuckets<CategoryId, &DiscountCandidate> = OrderedBuckets::new();
    for candidate in auto {
        if let Some(category) = candidate.category_id.and_then(CategoryId::assigned) {
            by_category.push(category, candidate);
        }
    }
    by_category.sort_each_by(|a, b| compare(a, b));
    by_category.truncate_each(config.per_category_cap);

    let mut categories: Vec<&[&DiscountCandidate]> =
        by_category.iter().map(|(_, bucket)| bucket).collect();
    categories.sort_by(|a, b| match (a.first(), b.first()) {
        (Some(a), Some(b)) => compare(a, b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let remaining = limit - picked.len();
    picked.extend(RoundRobin::new(categories).take(remaining));
    picked
}
