//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Login form validation and the login flow that drives the session store

pub mod auth;
