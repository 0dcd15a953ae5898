//! Cart session resolution.
//!
//! Turns the cart id a shopper carries (cookie or form field) into a cart
//! that exists server-side. A missing or stale id is never an error: a fresh
//! cart is created instead so page rendering is never blocked by cart state.

use std::future::Future;

use medusa_storefront_core::CartId;
use tracing::instrument;

use crate::medusa::{Cart, MedusaClient, MedusaError};

/// Cart operations the resolver needs from the commerce backend.
pub trait CartBackend: Send + Sync {
    /// Create a new, empty cart.
    fn create_cart(&self) -> impl Future<Output = Result<Cart, MedusaError>> + Send;

    /// Look up an existing cart.
    fn retrieve_cart(&self, id: &CartId)
    -> impl Future<Output = Result<Cart, MedusaError>> + Send;
}

impl CartBackend for MedusaClient {
    async fn create_cart(&self) -> Result<Cart, MedusaError> {
        Self::create_cart(self).await
    }

    async fn retrieve_cart(&self, id: &CartId) -> Result<Cart, MedusaError> {
        Self::retrieve_cart(self, id).await
    }
}

/// Outcome of [`resolve_cart`].
#[derive(Debug, Clone)]
pub struct ResolvedCart {
    pub cart: Cart,
    /// The returned cart's id differs from the one passed in; the caller
    /// must persist the new id.
    pub changed: bool,
}

/// Return a valid cart for `cart_id`, creating one when needed.
///
/// - No id (or an empty one): a new cart is created.
/// - Otherwise the cart is retrieved; any retrieval failure (not found,
///   network, malformed id) falls back to creating a new cart.
///
/// # Errors
///
/// Only cart creation failures are returned.
#[instrument(skip(cart_id, backend), fields(cart_id = cart_id.map_or("", CartId::as_str)))]
pub async fn resolve_cart<B: CartBackend>(
    cart_id: Option<&CartId>,
    backend: &B,
) -> Result<ResolvedCart, MedusaError> {
    let existing = match cart_id.filter(|id| !id.is_empty()) {
        Some(id) => match backend.retrieve_cart(id).await {
            Ok(cart) => Some(cart),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Stored cart no longer exists, creating a new one");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to retrieve cart, creating a new one");
                None
            }
        },
        None => None,
    };

    let cart = match existing {
        Some(cart) => cart,
        None => backend.create_cart().await?,
    };

    let changed = cart_id != Some(&cart.id);
    Ok(ResolvedCart { cart, changed })
}
