//! Remote catalog and authentication API.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`
//! - The remote API is the source of truth for products - NO local sync
//! - In-memory caching via `moka` for the product list (TTL from config)
//!
//! # Endpoints
//!
//! - `GET  /products` - every product
//! - `GET  /products/{id}` - one product
//! - `POST /auth/login` - `{username, password}` to `{token}`
//!
//! # Example
//!
//! ```rust,ignore
//! use eliteshop_storefront::api::FakeStoreClient;
//!
//! let client = FakeStoreClient::new(&config.api)?;
//! let products = client.get_products().await?;
//! ```

mod cache;
mod client;

pub use client::FakeStoreClient;

use std::fmt;
use std::future::Future;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Errors that can occur when talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A request URL could not be built from the base URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Login was rejected.
    #[error("invalid credentials (HTTP {0})")]
    InvalidCredentials(u16),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },
}

/// Opaque token returned by a successful login.
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for storing in the session snapshot.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// The remote login call, abstracted so the login flow can run without a network.
pub trait Authenticator {
    /// Exchange credentials for a token.
    fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<AuthToken, ApiError>> + Send;
}

/// Keep logged response bodies short.
pub(crate) fn truncate_body(body: &str) -> String {
    body.chars().take(200).collect()
}
