//! Search/listing composer.
//!
//! Products are split by whether their title or code contains the query, then
//! by category. Each cell is ordered newest first. Cells are emitted in
//! relevance stages until the page cap is reached:
//!
//! | Stage | With a primary category | Without one |
//! |-------|-------------------------|-------------|
//! | 1 | matches in the primary category | all matches |
//! | 2 | matches in other matched categories | non-matches in matched categories |
//! | 3 | non-matches in the primary category | categories with no match |
//! | 4 | non-matches in other matched categories | |
//! | 5 | categories with no match | |
//!
//! Price stats are taken over the generated list before the price filter, so
//! the envelope shown to the shopper does not shrink as they filter.

use std::cmp::Ordering;
use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ListingConfig;
use super::buckets::OrderedBuckets;
use super::candidate::ListingProduct;
use crate::types::{CategoryId, PriceRange, PriceStats, ProductId, SortMode};

/// Parameters of a listing request that reach the composer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Search text. Matching is case-insensitive.
    pub search: String,
    pub primary_category: Option<CategoryId>,
    pub price_range: PriceRange,
    pub sort: SortMode,
}

/// A generated product with the stage that emitted it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedProduct<'a> {
    pub product: &'a ListingProduct,
    /// Relevance stage, starting at 1.
    pub stage: u8,
    /// Position in generator order.
    pub rank: usize,
}

/// Output of [`generate_listing`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedListing<'a> {
    pub items: Vec<RankedProduct<'a>>,
    /// Whether the listing spans more than the requested category.
    pub mixed: bool,
}

/// Output of [`compose_listing`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedListing<'a> {
    /// Filtered and sorted products.
    pub items: Vec<RankedProduct<'a>>,
    pub mixed: bool,
    /// Price envelope of the generated list, before price filtering.
    pub stats: PriceStats,
}

impl<'a> ComposedListing<'a> {
    /// Slice a page out of the composed products.
    pub fn page(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Iterator<Item = &'a ListingProduct> + '_ {
        self.items.iter().skip(offset).take(limit).map(|item| item.product)
    }
}

struct Emitter<'a> {
    items: Vec<RankedProduct<'a>>,
    used: HashSet<ProductId>,
    cap: usize,
    primary: Option<CategoryId>,
    mixed: bool,
}

impl<'a> Emitter<'a> {
    fn new(cap: usize, primary: Option<CategoryId>) -> Self {
        Self {
            items: Vec::new(),
            used: HashSet::new(),
            cap,
            primary,
            mixed: false,
        }
    }

    fn is_full(&self) -> bool {
        self.items.len() >= self.cap
    }

    fn emit(&mut self, bucket: Option<&[&'a ListingProduct]>, stage: u8, category: CategoryId) {
        let Some(bucket) = bucket else { return };
        for &product in bucket {
            if self.is_full() {
                break;
            }
            if !self.used.insert(product.id) {
                continue;
            }
            if self.primary.is_some_and(|primary| primary != category) {
                self.mixed = true;
            }
            self.items.push(RankedProduct {
                product,
                stage,
                rank: self.items.len(),
            });
        }
    }
}

/// Run the staged generator over a snapshot of products.
///
/// Products without a category, or with a zero category, are skipped.
#[must_use]
pub fn generate_listing<'a>(
    products: &'a [ListingProduct],
    search: &str,
    primary: Option<CategoryId>,
    config: &ListingConfig,
) -> GeneratedListing<'a> {
    let needle = search.to_lowercase();

    let mut matches: OrderedBuckets<CategoryId, &ListingProduct> = OrderedBuckets::new();
    let mut others: OrderedBuckets<CategoryId, &ListingProduct> = OrderedBuckets::new();
    let mut categories: Vec<CategoryId> = Vec::new();
    let mut seen: HashSet<CategoryId> = HashSet::new();

    for product in products {
        let Some(category) = product.category_id.and_then(CategoryId::assigned) else {
            continue;
        };
        if seen.insert(category) {
            categories.push(category);
        }
        if product.matches(&needle) {
            matches.push(category, product);
        } else {
            others.push(category, product);
        }
    }

    let newest_first = |a: &&ListingProduct, b: &&ListingProduct| {
        b.recency_millis().cmp(&a.recency_millis())
    };
    matches.sort_each_by(newest_first);
    others.sort_each_by(newest_first);

    let unmatched: Vec<CategoryId> = categories
        .iter()
        .copied()
        .filter(|c| !matches.contains_key(c))
        .collect();

    let mut emitter = Emitter::new(config.page_cap, primary);

    if let Some(primary) = primary {
        let other_matched: Vec<CategoryId> = matches.keys().filter(|c| *c != primary).collect();

        emitter.emit(matches.get(&primary), 1, primary);
        for &category in &other_matched {
            emitter.emit(matches.get(&category), 2, category);
        }
        emitter.emit(others.get(&primary), 3, primary);
        for &category in &other_matched {
            emitter.emit(others.get(&category), 4, category);
        }
        for &category in unmatched.iter().filter(|c| **c != primary) {
            emitter.emit(others.get(&category), 5, category);
        }

        GeneratedListing {
            mixed: emitter.mixed,
            items: emitter.items,
        }
    } else {
        let matched: Vec<CategoryId> = matches.keys().collect();

        for &category in &matched {
            emitter.emit(matches.get(&category), 1, category);
        }
        for &category in &matched {
            emitter.emit(others.get(&category), 2, category);
        }
        for &category in &unmatched {
            emitter.emit(others.get(&category), 3, category);
        }

        let spanned: HashSet<CategoryId> = emitter
            .items
            .iter()
            .filter_map(|item| item.product.category_id)
            .collect();

        GeneratedListing {
            mixed: spanned.len() > 1,
            items: emitter.items,
        }
    }
}

/// Price envelope across every variant price of the given products.
#[must_use]
pub fn price_stats(items: &[RankedProduct<'_>]) -> PriceStats {
    PriceStats::from_prices(items.iter().flat_map(|item| item.product.prices()))
}

/// Keep products whose cheapest variant lies inside `range`.
///
/// Products without any price are dropped once a bound is set.
#[must_use]
pub fn filter_by_price<'a>(
    items: Vec<RankedProduct<'a>>,
    range: &PriceRange,
) -> Vec<RankedProduct<'a>> {
    if range.is_unbounded() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| item.product.min_price().is_some_and(|price| range.contains(price)))
        .collect()
}

/// Missing prices sort after every known price.
fn cmp_min_price(a: Option<Decimal>, b: Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Reorder generated items for the requested sort mode.
///
/// Price sorts never move an item across stages; generator rank breaks ties.
pub fn apply_sort(items: &mut [RankedProduct<'_>], sort: SortMode) {
    match sort {
        SortMode::Newest => items.sort_by_key(|item| item.rank),
        SortMode::PriceAsc => items.sort_by(|a, b| {
            a.stage
                .cmp(&b.stage)
                .then_with(|| cmp_min_price(a.product.min_price(), b.product.min_price()))
                .then_with(|| a.rank.cmp(&b.rank))
        }),
        SortMode::PriceDesc => items.sort_by(|a, b| {
            a.stage
                .cmp(&b.stage)
                .then_with(|| cmp_min_price(b.product.min_price(), a.product.min_price()))
                .then_with(|| a.rank.cmp(&b.rank))
        }),
    }
}

/// Generate, measure, filter and sort a listing.
#[must_use]
pub fn compose_listing<'a>(
    products: &'a [ListingProduct],
    query: &ListingQuery,
    config: &ListingConfig,
) -> ComposedListing<'a> {
    let generated = generate_listing(products, &query.search, query.primary_category, config);
    let stats = price_stats(&generated.items);

    let mut items = filter_by_price(generated.items, &query.price_range);
    apply_sort(&mut items, query.sort);

    ComposedListing {
        items,
        mixed: generated.mixed,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::super::DEFAULT_LISTING_PAGE_CAP;
    use super::super::candidate::fixtures::{product, with_prices};
    use super::*;

    const A: i64 = 1;
    const B: i64 = 2;
    const C: i64 = 3;

    fn ids(items: &[RankedProduct<'_>]) -> Vec<i64> {
        items.iter().map(|item| item.product.id.as_i64()).collect()
    }

    fn stages(items: &[RankedProduct<'_>]) -> Vec<u8> {
        items.iter().map(|item| item.stage).collect()
    }

    fn generate<'a>(
        products: &'a [ListingProduct],
        search: &str,
        primary: Option<i64>,
    ) -> GeneratedListing<'a> {
        let config = ListingConfig::default();
        generate_listing(products, search, primary.map(CategoryId::new), &config)
    }

    #[test]
    fn test_primary_category_example() {
        let products = vec![
            product(1, Some(A), "Mug one", 2),
            product(2, Some(A), "Lamp", 3),
            product(3, Some(B), "Mug three", 1),
        ];
        let generated = generate(&products, "mug", Some(A));
        assert_eq!(ids(&generated.items), vec![1, 3, 2]);
        assert_eq!(stages(&generated.items), vec![1, 2, 3]);
        assert!(generated.mixed);
    }

    #[test]
    fn test_primary_category_all_five_stages() {
        let products = vec![
            product(1, Some(A), "mug", 10),
            product(2, Some(B), "mug", 10),
            product(3, Some(A), "plate", 10),
            product(4, Some(B), "bowl", 10),
            product(5, Some(C), "spoon", 10),
        ];
        let generated = generate(&products, "MUG", Some(A));
        assert_eq!(ids(&generated.items), vec![1, 2, 3, 4, 5]);
        assert_eq!(stages(&generated.items), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_primary_only_is_not_mixed() {
        let products = vec![product(1, Some(A), "mug", 1), product(2, Some(A), "lamp", 2)];
        let generated = generate(&products, "mug", Some(A));
        assert_eq!(ids(&generated.items), vec![1, 2]);
        assert!(!generated.mixed);
    }

    #[test]
    fn test_without_primary_stages_and_mixed() {
        let products = vec![
            product(1, Some(A), "lamp", 5),
            product(2, Some(B), "mug", 1),
            product(3, Some(C), "spoon", 9),
            product(4, Some(A), "mug", 2),
        ];
        let generated = generate(&products, "mug", None);
        // Matched categories keep the order of their first match: B then A.
        assert_eq!(ids(&generated.items), vec![2, 4, 1, 3]);
        assert_eq!(stages(&generated.items), vec![1, 1, 2, 3]);
        assert!(generated.mixed);
    }

    #[test]
    fn test_without_primary_single_category_not_mixed() {
        let products = vec![product(1, Some(A), "mug", 1), product(2, Some(A), "lamp", 2)];
        assert!(!generate(&products, "mug", None).mixed);
    }

    #[test]
    fn test_buckets_newest_first_missing_time_oldest() {
        let mut undated = product(1, Some(A), "mug", 0);
        undated.created_at = None;
        let products = vec![
            undated,
            product(2, Some(A), "mug", 50),
            product(3, Some(A), "mug", 100),
        ];
        assert_eq!(ids(&generate(&products, "mug", None).items), vec![3, 2, 1]);
    }

    #[test]
    fn test_uncategorized_skipped_and_duplicates_emitted_once() {
        let products = vec![
            product(1, None, "mug", 1),
            product(2, Some(A), "mug", 1),
            product(2, Some(A), "mug", 1),
        ];
        assert_eq!(ids(&generate(&products, "mug", None).items), vec![2]);
    }

    #[test]
    fn test_matches_product_code() {
        let mut coded = product(1, Some(A), "Vase", 1);
        coded.product_code = Some("ZX-9".to_string());
        let products = vec![product(2, Some(A), "Lamp", 5), coded];
        let generated = generate(&products, "zx", None);
        assert_eq!(ids(&generated.items), vec![1, 2]);
        assert_eq!(stages(&generated.items), vec![1, 2]);
    }

    #[test]
    fn test_page_cap_stops_early() {
        let products: Vec<ListingProduct> = (1..=80)
            .map(|i| product(i, Some(i % 4), "mug", i))
            .collect();
        let generated = generate(&products, "mug", Some(1));
        assert_eq!(generated.items.len(), 50);
        assert!(generated.items.iter().take(20).all(|item| item.stage == 1));
    }

    #[test]
    fn test_stats_ignore_price_filter() {
        let products = vec![with_prices(product(1, Some(A), "mug", 1), &[100, 50, 200])];
        let query = ListingQuery {
            search: "mug".to_string(),
            price_range: PriceRange::new(Some(Decimal::from(150)), Some(Decimal::from(300))),
            ..ListingQuery::default()
        };
        let composed = compose_listing(&products, &query, &ListingConfig::default());
        assert!(composed.items.is_empty());
        assert_eq!(composed.stats.min, Decimal::from(50));
        assert_eq!(composed.stats.max, Decimal::from(200));
    }

    #[test]
    fn test_filter_uses_cheapest_variant() {
        let products = vec![
            with_prices(product(1, Some(A), "mug", 3), &[120, 300]),
            with_prices(product(2, Some(A), "mug", 2), &[80]),
            product(3, Some(A), "mug", 1),
        ];
        let generated = generate(&products, "mug", None);
        let range = PriceRange::new(Some(Decimal::from(100)), None);
        assert_eq!(ids(&filter_by_price(generated.items.clone(), &range)), vec![1]);
        assert_eq!(ids(&filter_by_price(generated.items, &PriceRange::unbounded())), vec![1, 2, 3]);
    }

    #[test]
    fn test_price_sort_keeps_stages() {
        let products = vec![
            with_prices(product(1, Some(A), "mug", 9), &[300]),
            with_prices(product(2, Some(A), "mug", 8), &[100]),
            product(3, Some(A), "mug", 7),
            with_prices(product(4, Some(A), "lamp", 6), &[10]),
        ];
        let mut items = generate(&products, "mug", Some(A)).items;

        apply_sort(&mut items, SortMode::PriceAsc);
        assert_eq!(ids(&items), vec![2, 1, 3, 4]);

        apply_sort(&mut items, SortMode::PriceDesc);
        assert_eq!(ids(&items), vec![3, 1, 2, 4]);

        apply_sort(&mut items, SortMode::Newest);
        assert_eq!(ids(&items), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_page_slices_composed_items() {
        let products: Vec<ListingProduct> =
            (1..=5).map(|i| product(i, Some(A), "mug", i)).collect();
        let query = ListingQuery {
            search: "mug".to_string(),
            ..ListingQuery::default()
        };
        let composed = compose_listing(&products, &query, &ListingConfig::default());
        let page: Vec<i64> = composed.page(1, 2).map(|p| p.id.as_i64()).collect();
        assert_eq!(page, vec![4, 3]);
        assert_eq!(composed.page(10, 2).count(), 0);
    }

    fn product_strategy() -> impl Strategy<Value = ListingProduct> {
        (
            1..120i64,
            proptest::option::of(1..6i64),
            any::<bool>(),
            0..1000i64,
            proptest::collection::vec(1..500i64, 0..3),
        )
            .prop_map(|(id, category, is_match, created, prices)| {
                let title = if is_match { "blue mug" } else { "plate" };
                with_prices(product(id, category, title, created), &prices)
            })
    }

    fn range_strategy() -> impl Strategy<Value = PriceRange> {
        (proptest::option::of(0..500i64), proptest::option::of(0..500i64))
            .prop_map(|(min, max)| PriceRange::new(min.map(Decimal::from), max.map(Decimal::from)))
    }

    proptest! {
        #[test]
        fn prop_generated_is_capped_and_unique(
            products in proptest::collection::vec(product_strategy(), 0..150),
            primary in proptest::option::of(1..6i64),
        ) {
            let generated = generate(&products, "mug", primary);
            prop_assert!(generated.items.len() <= DEFAULT_LISTING_PAGE_CAP);
            let unique: HashSet<ProductId> = generated.items.iter().map(|i| i.product.id).collect();
            prop_assert_eq!(unique.len(), generated.items.len());
        }

        #[test]
        fn prop_stats_unaffected_by_price_range(
            products in proptest::collection::vec(product_strategy(), 0..80),
            range in range_strategy(),
            primary in proptest::option::of(1..6i64),
        ) {
            let base = ListingQuery {
                search: "mug".to_string(),
                primary_category: primary.map(CategoryId::new),
                ..ListingQuery::default()
            };
            let filtered = ListingQuery { price_range: range, ..base.clone() };
            let config = ListingConfig::default();
            prop_assert_eq!(
                compose_listing(&products, &base, &config).stats,
                compose_listing(&products, &filtered, &config).stats
            );
        }

        #[test]
        fn prop_newest_is_idempotent(
            products in proptest::collection::vec(product_strategy(), 0..80),
        ) {
            let query = ListingQuery { search: "mug".to_string(), ..ListingQuery::default() };
            let config = ListingConfig::default();
            let first = compose_listing(&products, &query, &config);
            let second = compose_listing(&products, &query, &config);
            prop_assert_eq!(ids(&first.items), ids(&second.items));
            let ranks: Vec<_> = first.items.iter().map(|item| item.rank).collect();
            prop_assert!(ranks.windows(2).all(|w| w.first() < w.get(1)));
        }
    }
}
