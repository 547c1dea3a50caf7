//! HTTP client for the demo store API.
//!
//! Caches the product list and individual products using `moka`.

use std::future::Future;
use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use eliteshop_core::ProductId;

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, AuthToken, Authenticator, truncate_body};
use crate::catalog::Product;
use crate::config::ApiConfig;

/// Request body for `POST /auth/login`.
#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Response body for `POST /auth/login`.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct LoginResponse {
    token: String,
}

/// Client for the catalog and auth API.
///
/// Cheaply cloneable; clones share the connection pool and cache.
#[derive(Clone)]
pub struct FakeStoreClient {
    inner: Arc<FakeStoreClientInner>,
}

struct FakeStoreClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl FakeStoreClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(FakeStoreClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Resolve `path` against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok());
            return Err(rate_limited(retry_after));
        }

        let body = response.text().await?;
        check_status(status, body)
    }

    /// GET `path` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let body = self.send(self.inner.client.get(url)).await?;
        parse_body(&body)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Get every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("products").await?;
        debug!(count = products.len(), "fetched products");

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get one product by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the API has no such product, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        // A cached full listing answers single lookups too
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
            && let Some(product) = products.into_iter().find(|p| p.id == id)
        {
            debug!("Product found in cached listing");
            return Ok(product);
        }

        let url = self.endpoint(&format!("products/{id}"))?;
        let body = self.send(self.inner.client.get(url)).await?;
        let product = parse_optional_body::<Product>(&body)?
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidCredentials` for any non-2xx response, or a
    /// transport/parse error.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AuthToken, ApiError> {
        let url = self.endpoint("auth/login")?;
        let request = self.inner.client.post(url).json(&LoginRequest {
            username,
            password: password.expose_secret(),
        });

        let body = self.send(request).await.map_err(login_error)?;

        let response: LoginResponse = parse_body(&body)?;
        Ok(AuthToken::new(response.token))
    }
}

impl Authenticator for FakeStoreClient {
    fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<AuthToken, ApiError>> + Send {
        self.login(username, password)
    }
}

/// `RateLimited` with the `Retry-After` seconds, 1 if absent or not a number.
fn rate_limited(retry_after: Option<&str>) -> ApiError {
    ApiError::RateLimited(
        retry_after
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(1),
    )
}

/// Pass a 2xx body through; anything else becomes `ApiError::Status`.
fn check_status(status: StatusCode, body: String) -> Result<String, ApiError> {
    if status.is_success() {
        return Ok(body);
    }
    tracing::error!(
        status = %status,
        body = %truncate_body(&body),
        "store API returned non-success status"
    );
    Err(ApiError::Status {
        status: status.as_u16(),
        body: truncate_body(&body),
    })
}

/// Every rejected login, rate limiting included, is reported as bad credentials.
fn login_error(error: ApiError) -> ApiError {
    match error {
        ApiError::Status { status, .. } => ApiError::InvalidCredentials(status),
        ApiError::RateLimited(_) => {
            ApiError::InvalidCredentials(StatusCode::TOO_MANY_REQUESTS.as_u16())
        }
        other => other,
    }
}

/// Decode a JSON body, logging the start of the body on failure.
fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %truncate_body(body),
            "Failed to parse store API response"
        );
        ApiError::Parse(e)
    })
}

/// Decode a body where an empty response or `null` means "no such resource".
fn parse_optional_body<T: DeserializeOwned>(body: &str) -> Result<Option<T>, ApiError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    parse_body::<Option<T>>(body)
}
