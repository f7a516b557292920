//! "Better of two" comparator for discount candidates.
//!
//! The preference order is a fixed chain of tie-break levels evaluated lazily:
//! the first level that tells two candidates apart decides. The last level is
//! the variant identity, so two distinct variants never compare equal.
//!
//! | Level | Key | Direction |
//! |-------|-----|-----------|
//! | 1 | discount percentage | larger wins |
//! | 2 | savings (`price - discounted`) | larger wins |
//! | 3 | recency (pin, own, parent timestamp) | newer wins |
//! | 4 | effective stock | larger wins |
//! | 5 | variant id | larger wins |

use std::cmp::Ordering;

use rust_decimal::Decimal;

use super::candidate::DiscountCandidate;

/// Sort direction of a single tie-break level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smaller key is preferred.
    Ascending,
    /// Larger key is preferred.
    Descending,
}

/// One level of the tie-break chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    DiscountPercent,
    Savings,
    Recency,
    Stock,
    Identity,
}

/// Key extracted from a candidate for a single level.
///
/// Keys of the same level always share a variant, so the derived ordering is
/// only ever used between like values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RankKey {
    Amount(Decimal),
    Millis(i64),
    Count(i64),
}

impl TieBreak {
    /// Extract this level's key from a candidate.
    #[must_use]
    pub fn extract(self, candidate: &DiscountCandidate) -> RankKey {
        match self {
            Self::DiscountPercent => RankKey::Amount(candidate.discount()),
            Self::Savings => RankKey::Amount(candidate.savings()),
            Self::Recency => RankKey::Millis(candidate.recency_millis()),
            Self::Stock => RankKey::Count(candidate.effective_stock()),
            Self::Identity => RankKey::Count(candidate.variant_id.as_i64()),
        }
    }
}

/// The full preference chain, most significant level first.
pub const PREFERENCE_CHAIN: [(TieBreak, Direction); 5] = [
    (TieBreak::DiscountPercent, Direction::Descending),
    (TieBreak::Savings, Direction::Descending),
    (TieBreak::Recency, Direction::Descending),
    (TieBreak::Stock, Direction::Descending),
    (TieBreak::Identity, Direction::Descending),
];

/// Pinned entries are ordered by pin recency alone, then identity.
const PIN_ORDER: [(TieBreak, Direction); 2] = [
    (TieBreak::Recency, Direction::Descending),
    (TieBreak::Identity, Direction::Descending),
];

/// Compare two candidates on a single level.
///
/// `Ordering::Less` means `a` is preferred.
#[must_use]
pub fn compare_level(
    level: TieBreak,
    direction: Direction,
    a: &DiscountCandidate,
    b: &DiscountCandidate,
) -> Ordering {
    let ord = level.extract(a).cmp(&level.extract(b));
    match direction {
        Direction::Ascending => ord,
        Direction::Descending => ord.reverse(),
    }
}

fn compare_chain(
    chain: &[(TieBreak, Direction)],
    a: &DiscountCandidate,
    b: &DiscountCandidate,
) -> Ordering {
    chain
        .iter()
        .map(|&(level, direction)| compare_level(level, direction, a, b))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Compare two candidates with the full preference chain.
///
/// `Ordering::Less` means `a` is preferred, so sorting with this comparator
/// puts the best candidate first.
#[must_use]
pub fn compare(a: &DiscountCandidate, b: &DiscountCandidate) -> Ordering {
    compare_chain(&PREFERENCE_CHAIN, a, b)
}

/// Compare two pinned candidates: newest pin first, then larger identity.
#[must_use]
pub fn compare_pinned(a: &DiscountCandidate, b: &DiscountCandidate) -> Ordering {
    compare_chain(&PIN_ORDER, a, b)
}

/// Return the preferred candidate. Keeps `current` unless `challenger` is strictly better.
#[must_use]
pub fn prefer<'a>(
    current: &'a DiscountCandidate,
    challenger: &'a DiscountCandidate,
) -> &'a DiscountCandidate {
    if compare(challenger, current).is_lt() {
        challenger
    } else {
        current
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::super::candidate::fixtures::{at, discount};
    use super::*;

    #[test]
    fn test_level_one_discount_percent() {
        let a = discount(1, 1, 30);
        let b = discount(2, 2, 20);
        assert_eq!(compare(&a, &b), Ordering::Less);
        assert_eq!(compare(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_level_two_savings() {
        let mut a = discount(1, 1, 20);
        let mut b = discount(2, 2, 20);
        a.price = Some(Decimal::from(500));
        a.discounted_price = Some(Decimal::from(400));
        b.price = Some(Decimal::from(50));
        b.discounted_price = Some(Decimal::from(40));
        assert_eq!(
            compare_level(TieBreak::DiscountPercent, Direction::Descending, &a, &b),
            Ordering::Equal
        );
        assert_eq!(compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_level_three_recency() {
        let mut a = discount(1, 1, 20);
        let mut b = discount(2, 2, 20);
        a.created_at = at(100);
        b.created_at = at(200);
        assert_eq!(compare(&a, &b), Ordering::Greater);

        b.created_at = None;
        b.product_created_at = None;
        assert_eq!(compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_level_four_stock() {
        let mut a = discount(1, 1, 20);
        let mut b = discount(2, 2, 20);
        a.stock_quantity = Some(50);
        b.stock_quantity = Some(-10);
        assert_eq!(compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_level_five_identity() {
        let a = discount(1, 1, 20);
        let b = discount(2, 1, 20);
        assert_eq!(compare(&a, &b), Ordering::Greater);
        assert_eq!(compare(&a, &a), Ordering::Equal);
    }

    #[test]
    fn test_prefer_keeps_current_on_tie() {
        let current = discount(3, 1, 20);
        let same = current.clone();
        assert!(std::ptr::eq(prefer(&current, &same), &current));

        let better = discount(4, 1, 25);
        assert!(std::ptr::eq(prefer(&current, &better), &better));
    }

    #[test]
    fn test_pinned_order_ignores_discount() {
        let mut old_big = discount(1, 1, 70);
        let mut new_small = discount(2, 2, 5);
        old_big.pinned_at = at(10);
        new_small.pinned_at = at(20);
        assert_eq!(compare_pinned(&new_small, &old_big), Ordering::Less);
    }

    fn candidate_strategy() -> impl Strategy<Value = DiscountCandidate> {
        (
            1..50i64,
            0..5i64,
            0..4i64,
            0..3i64,
            proptest::option::of(0..4i64),
            -2..4i64,
        )
            .prop_map(|(id, product, percent, price_step, created, stock)| {
                let mut c = discount(id, product, percent * 10);
                c.price = Some(Decimal::from(100 + price_step * 50));
                c.created_at = created.and_then(at);
                c.stock_quantity = Some(stock);
                c
            })
    }

    proptest! {
        /// Distinct identities never tie through the whole chain.
        #[test]
        fn prop_total_order_on_distinct_ids(a in candidate_strategy(), b in candidate_strategy()) {
            prop_assume!(a.variant_id != b.variant_id);
            let ab = compare(&a, &b);
            prop_assert_ne!(ab, Ordering::Equal);
            prop_assert_eq!(ab, compare(&b, &a).reverse());
        }

        /// Preference is transitive.
        #[test]
        fn prop_transitive(
            a in candidate_strategy(),
            b in candidate_strategy(),
            c in candidate_strategy(),
        ) {
            if compare(&a, &b).is_lt() && compare(&b, &c).is_lt() {
                prop_assert!(compare(&a, &c).is_lt());
            }
        }
    }
}
