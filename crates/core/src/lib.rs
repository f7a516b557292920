//! Mazin Core - Shared catalog types and the product ranking engine.
//!
//! This crate is used by:
//! - `storefront` - The catalog API consumed by the storefront frontend
//! - `integration-tests` - End-to-end and public API tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Candidates are fetched by the storefront and handed
//! to the ranking engine as an in-memory snapshot.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, price ranges/stats and sort modes
//! - [`ranking`] - Comparator, bucketing, interleaving and result composition

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ranking;
pub mod types;

pub use types::*;
