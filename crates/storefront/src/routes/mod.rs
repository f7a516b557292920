//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                   - Health check
//! GET  /health/ready             - Readiness check (database)
//!
//! # Products
//! GET  /api/products             - Category or search listing
//! GET  /api/products/stats       - Price envelope of a listing
//! POST /api/products/view        - Record a product view
//! GET  /api/products/most-viewed - Most viewed products
//!
//! # Search
//! GET  /api/search               - Search suggestions
//!
//! # Home
//! GET  /api/home/discounted      - Homepage discount strip
//!
//! # Types
//! GET  /api/types                - Product types with attributes
//! ```

pub mod categories;
pub mod home;
pub mod params;
pub mod products;
pub mod search;

use axum::Router;

use crate::state::AppState;

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", products::router())
        .nest("/api/search", search::router())
        .nest("/api/home", home::router())
        .nest("/api/types", categories::router())
}
