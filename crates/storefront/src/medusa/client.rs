//! Medusa store API client implementation.
//!
//! Uses `reqwest` for HTTP with JSON bodies.
//! Caches single-product lookups using `moka` (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use medusa_storefront_core::{CartId, ProductId, VariantId};

use super::MedusaError;
use super::retry::retry_with_backoff;
use super::types::{
    ApiErrorBody, Cart, CartResponse, LineItemInput, Product, ProductListParams, ProductPage,
    ProductResponse,
};
use crate::config::MedusaConfig;

/// Header carrying the publishable API key.
const PUBLISHABLE_KEY_HEADER: &str = "x-publishable-api-key";

/// Header making retried POSTs safe to replay.
const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

// =============================================================================
// MedusaClient
// =============================================================================

/// Client for the Medusa store API.
///
/// Provides typed access to the product catalog and cart operations.
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct MedusaClient {
    inner: Arc<MedusaClientInner>,
}

struct MedusaClientInner {
    client: reqwest::Client,
    base_url: Url,
    publishable_key: Option<SecretString>,
    max_retries: u32,
    backoff_base: Duration,
    products: Cache<ProductId, Product>,
}

impl std::fmt::Debug for MedusaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MedusaClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("max_retries", &self.inner.max_retries)
            .finish_non_exhaustive()
    }
}

impl MedusaClient {
    /// Create a new store API client.
    ///
    /// # Errors
    ///
    /// Returns [`MedusaError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &MedusaConfig) -> Result<Self, MedusaError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("medusa-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(MedusaClientInner {
                client,
                base_url: config.base_url.clone(),
                publishable_key: config.publishable_key.clone(),
                max_retries: config.max_retries,
                backoff_base: config.backoff_base,
                products,
            }),
        })
    }

    /// Build `{base}/store/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, MedusaError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push("store")
            .extend(segments);
        Ok(url)
    }

    /// Execute a request with retries and decode the JSON response.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
        context: &str,
    ) -> Result<T, MedusaError> {
        // One key per logical request so the backend can deduplicate retries
        let idempotency_key = (method == Method::POST).then(|| Uuid::new_v4().to_string());

        retry_with_backoff(self.inner.max_retries, self.inner.backoff_base, || {
            let method = method.clone();
            let url = url.clone();
            let body = body.as_ref();
            let idempotency_key = idempotency_key.as_deref();
            async move {
                let mut request = self.inner.client.request(method, url.clone());
                if let Some(key) = &self.inner.publishable_key {
                    request = request.header(PUBLISHABLE_KEY_HEADER, key.expose_secret());
                }
                if let Some(key) = idempotency_key {
                    request = request.header(IDEMPOTENCY_KEY_HEADER, key);
                }
                if let Some(body) = body {
                    request = request.json(body);
                }

                let response = request.send().await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    return Err(MedusaError::RateLimited);
                }

                let text = response.text().await?;

                if status == StatusCode::NOT_FOUND {
                    return Err(MedusaError::NotFound(
                        error_message(&text).unwrap_or_else(|| url.path().to_string()),
                    ));
                }

                if !status.is_success() {
                    tracing::error!(
                        status = %status,
                        body = %text.chars().take(500).collect::<String>(),
                        "Commerce API returned non-success status"
                    );
                    return Err(MedusaError::UnexpectedStatus {
                        status: status.as_u16(),
                        message: error_message(&text)
                            .unwrap_or_else(|| text.chars().take(200).collect()),
                    });
                }

                serde_json::from_str::<T>(&text).map_err(|source| {
                    tracing::error!(
                        error = %source,
                        body = %text.chars().take(500).collect::<String>(),
                        "Failed to parse commerce API response"
                    );
                    MedusaError::Decode {
                        context: context.to_string(),
                        source,
                    }
                })
            }
        })
        .await
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List products, optionally filtered by a free-text query.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(q = ?params.q, limit = params.limit, offset = params.offset))]
    pub async fn list_products(
        &self,
        params: &ProductListParams,
    ) -> Result<ProductPage, MedusaError> {
        let mut url = self.endpoint(&["products"])?;
        url.query_pairs_mut()
            .extend_pairs(params.query_pairs().iter().map(|(k, v)| (*k, v.as_str())));

        let page: ProductPage = self.send(Method::GET, url, None, "product list").await?;
        debug!(returned = page.products.len(), count = page.count, "Listed products");
        Ok(page)
    }

    /// Get a product by its id.
    ///
    /// # Errors
    ///
    /// Returns [`MedusaError::NotFound`] if the product does not exist, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn retrieve_product(&self, id: &ProductId) -> Result<Product, MedusaError> {
        if let Some(product) = self.inner.products.get(id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = self.endpoint(&["products", id.as_str()])?;
        let response: ProductResponse = self.send(Method::GET, url, None, "product").await?;

        self.inner
            .products
            .insert(id.clone(), response.product.clone())
            .await;

        Ok(response.product)
    }

    /// Drop a cached product so the next lookup hits the API.
    pub async fn invalidate_product(&self, id: &ProductId) {
        self.inner.products.invalidate(id).await;
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Create a new, empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn create_cart(&self) -> Result<Cart, MedusaError> {
        let url = self.endpoint(&["carts"])?;
        let response: CartResponse = self
            .send(Method::POST, url, Some(serde_json::json!({})), "cart")
            .await?;
        debug!(cart_id = %response.cart.id, "Created cart");
        Ok(response.cart)
    }

    /// Get a cart by its id.
    ///
    /// # Errors
    ///
    /// Returns [`MedusaError::NotFound`] if the cart does not exist, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %id))]
    pub async fn retrieve_cart(&self, id: &CartId) -> Result<Cart, MedusaError> {
        let url = self.endpoint(&["carts", id.as_str()])?;
        let response: CartResponse = self.send(Method::GET, url, None, "cart").await?;
        Ok(response.cart)
    }

    /// Add a variant to a cart and return the updated cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart or variant does not exist or the API
    /// request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id, variant_id = %variant_id))]
    pub async fn add_line_item(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<Cart, MedusaError> {
        let url = self.endpoint(&["carts", cart_id.as_str(), "line-items"])?;
        let body = serde_json::to_value(LineItemInput {
            variant_id,
            quantity,
        })
        .map_err(|source| MedusaError::Decode {
            context: "line item input".to_string(),
            source,
        })?;

        let response: CartResponse = self.send(Method::POST, url, Some(body), "cart").await?;
        Ok(response.cart)
    }
}

/// Extract the `message` field of an API error body, if any.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.is_empty())
}
