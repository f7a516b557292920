//! Ranking engine tests through the public `mazin-core` API.
//!
//! These run without any services.

use rust_decimal::Decimal;

use mazin_core::ranking::{
    DiscountPickerConfig, ListingConfig, ListingProduct, ListingQuery, compose_listing,
    pick_home_discounts,
};
use mazin_core::{CategoryId, PriceRange, SortMode};
use mazin_integration_tests::{at, discounted_variant, listed_product};

fn variant_ids(picked: &[&mazin_core::ranking::DiscountCandidate]) -> Vec<i64> {
    picked.iter().map(|c| c.variant_id.as_i64()).collect()
}

fn product_ids<'a>(products: impl Iterator<Item = &'a ListingProduct>) -> Vec<i64> {
    products.map(|p| p.id.as_i64()).collect()
}

// ============================================================================
// Homepage discounts
// ============================================================================

fn discount_catalog() -> Vec<mazin_core::ranking::DiscountCandidate> {
    let in_category = |variant, product, category, percent| {
        let mut c = discounted_variant(variant, product, percent);
        c.category_id = Some(CategoryId::new(category));
        c
    };

    let mut pinned = in_category(60, 6, 3, 5);
    pinned.pinned = true;
    pinned.pinned_at = at(100);

    let mut pinned_sold_out = in_category(70, 7, 3, 60);
    pinned_sold_out.pinned = true;
    pinned_sold_out.pinned_at = at(200);
    pinned_sold_out.stock_quantity = Some(0);

    vec![
        in_category(11, 1, 1, 30),
        in_category(10, 1, 1, 50),
        in_category(20, 2, 1, 30),
        in_category(30, 3, 1, 20),
        in_category(40, 4, 2, 40),
        in_category(50, 5, 2, 15),
        pinned,
        pinned_sold_out,
        in_category(80, 8, 2, 5),
    ]
}

#[test]
fn test_home_discounts_full_strip() {
    let catalog = discount_catalog();
    let picked = pick_home_discounts(&catalog, 12, &DiscountPickerConfig::default());

    // Pin first, then categories interleaved by their strongest card, two per
    // category. Product 3 loses to the category cap, product 8 to the
    // threshold, product 7 is sold out.
    assert_eq!(variant_ids(&picked), vec![60, 10, 40, 20, 50]);
}

#[test]
fn test_home_discounts_respects_limit() {
    let catalog = discount_catalog();
    let config = DiscountPickerConfig::default();

    assert_eq!(
        variant_ids(&pick_home_discounts(&catalog, 3, &config)),
        vec![60, 10, 40]
    );
    assert!(pick_home_discounts(&catalog, 0, &config).is_empty());
}

#[test]
fn test_home_discounts_limit_is_capped_by_config() {
    let catalog: Vec<_> = (1..=20)
        .map(|i| {
            let mut c = discounted_variant(i, i, 20);
            c.category_id = Some(CategoryId::new(i));
            c
        })
        .collect();
    let config = DiscountPickerConfig {
        page_limit: 4,
        ..DiscountPickerConfig::default()
    };

    assert_eq!(pick_home_discounts(&catalog, 100, &config).len(), 4);
}

#[test]
fn test_home_discounts_one_card_per_product() {
    let catalog = discount_catalog();
    let picked = pick_home_discounts(&catalog, 12, &DiscountPickerConfig::default());

    let mut products: Vec<i64> = picked.iter().map(|c| c.product_id.as_i64()).collect();
    let total = products.len();
    products.sort_unstable();
    products.dedup();
    assert_eq!(products.len(), total);
}

// ============================================================================
// Search listings
// ============================================================================

fn listing_catalog() -> Vec<ListingProduct> {
    vec![
        listed_product(1, Some(1), "Mug small", 30, &[40]),
        listed_product(2, Some(1), "Mug large", 20, &[90]),
        listed_product(3, Some(2), "Travel mug", 10, &[60]),
        listed_product(4, Some(1), "Lamp", 40, &[10]),
        listed_product(5, None, "Loose mug", 50, &[5]),
    ]
}

fn mug_query(sort: SortMode, range: PriceRange) -> ListingQuery {
    ListingQuery {
        search: "mug".to_string(),
        primary_category: Some(CategoryId::new(1)),
        price_range: range,
        sort,
    }
}

#[test]
fn test_listing_stages_and_stats() {
    let catalog = listing_catalog();
    let composed = compose_listing(
        &catalog,
        &mug_query(SortMode::Newest, PriceRange::unbounded()),
        &ListingConfig::default(),
    );

    assert_eq!(product_ids(composed.page(0, 50)), vec![1, 2, 3, 4]);
    assert!(composed.mixed);
    assert_eq!(composed.stats.min, Decimal::from(10));
    assert_eq!(composed.stats.max, Decimal::from(90));
}

#[test]
fn test_listing_price_sort_stays_inside_stages() {
    let catalog = listing_catalog();
    let config = ListingConfig::default();

    let asc_query = mug_query(SortMode::PriceAsc, PriceRange::unbounded());
    let asc = compose_listing(&catalog, &asc_query, &config);
    assert_eq!(product_ids(asc.page(0, 50)), vec![1, 2, 3, 4]);

    let desc_query = mug_query(SortMode::PriceDesc, PriceRange::unbounded());
    let desc = compose_listing(&catalog, &desc_query, &config);
    assert_eq!(product_ids(desc.page(0, 50)), vec![2, 1, 3, 4]);
}

#[test]
fn test_listing_price_filter_keeps_stats() {
    let catalog = listing_catalog();
    let composed = compose_listing(
        &catalog,
        &mug_query(
            SortMode::Newest,
            PriceRange::new(Some(Decimal::from(50)), None),
        ),
        &ListingConfig::default(),
    );

    assert_eq!(product_ids(composed.page(0, 50)), vec![2, 3]);
    assert_eq!(composed.stats.min, Decimal::from(10));
}

#[test]
fn test_listing_paging() {
    let catalog = listing_catalog();
    let composed = compose_listing(
        &catalog,
        &mug_query(SortMode::Newest, PriceRange::unbounded()),
        &ListingConfig::default(),
    );

    assert_eq!(product_ids(composed.page(1, 2)), vec![2, 3]);
    assert!(composed.page(10, 5).next().is_none());
}

#[test]
fn test_listing_product_reads_catalog_json() {
    let product: ListingProduct = serde_json::from_value(serde_json::json!({
        "id": 7,
        "title": "Mug",
        "product_code": "MG-7",
        "type_id": 3,
        "image_urls": ["mug.jpg"],
        "created_at": "2024-05-01T10:00:00Z",
        "product_variants": [
            {"id": 70, "price": "12.50", "stock_quantity": 4},
            {"id": 71}
        ]
    }))
    .expect("catalog row should deserialize");

    assert_eq!(product.category_id, Some(CategoryId::new(3)));
    assert_eq!(product.min_price(), Some(Decimal::new(1250, 2)));
    assert!(product.matches("mg-"));
}
