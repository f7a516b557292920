//! API models for the storefront.
//!
//! Response bodies keep the field names the frontend already consumes, so a
//! few of them are camelCase and a few mirror catalog columns.

pub mod product;
pub mod session;

pub use product::{
    HomeDiscountCard, HomeDiscountsResponse, MostViewedResponse, PriceStatsBody, ProductRecord,
    ProductsResponse, SearchResponse, TypesResponse, ViewRecorded,
};
pub use session::session_keys;

/// Serialize decimals as JSON numbers.
pub(crate) mod decimal_number {
    use rust_decimal::Decimal;
    use rust_decimal::prelude::ToPrimitive;
    use serde::Serializer;

    #[allow(clippy::trivially_copy_pass_by_ref)] // serde's `serialize_with` passes a reference
    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.to_f64().unwrap_or_default())
    }
}
