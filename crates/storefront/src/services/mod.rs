//! Business logic services for storefront.
//!
//! # Services
//!
//! - `catalog` - Search and category listings, price stats
//! - `home` - Homepage discount strip
//! - `categories` - Cached category list
//! - `identity` - Bearer token lookup against the identity provider

pub mod catalog;
pub mod categories;
pub mod home;
pub mod identity;

pub use catalog::{CatalogService, ListingParams};
pub use categories::CategoryCache;
pub use identity::{IdentityClient, IdentityError};
