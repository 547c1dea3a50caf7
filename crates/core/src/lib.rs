//! EliteShop Core - Shared types library.
//!
//! This crate provides common types used across all EliteShop components:
//! - `storefront` - Cart and session state stores plus the catalog API client
//! - `cli` - Command-line front-end that renders state and dispatches intents
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
