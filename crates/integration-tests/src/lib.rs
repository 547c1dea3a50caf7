//! Integration tests for EliteShop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p eliteshop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_properties` - Cart store laws over long operation sequences
//! - `session_lifecycle` - Login, restart and logout against a real snapshot file
//!
//! No network access is needed: the login flow runs against an in-process
//! authenticator.
