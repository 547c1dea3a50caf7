//! EliteShop storefront library.
//!
//! Cart and session stores for the storefront front-end, together with the
//! catalog client and login flow that feed them. Kept as a library so the
//! CLI and the integration tests share one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod observer;
pub mod services;
pub mod session;
pub mod state;
