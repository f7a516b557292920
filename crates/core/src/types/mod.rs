//! Core types for Mazin.
//!
//! This module provides type-safe wrappers for common catalog concepts.

pub mod id;
pub mod price;
pub mod sort;

pub use id::*;
pub use price::{PriceRange, PriceStats};
pub use sort::SortMode;
