//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /?term=...              - Product search/list page (grid fragment for HTMX)
//! POST /                       - Add a product's primary variant to the cart
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products/{id}          - Product detail
//!
//! # Cart
//! GET  /cart                   - Cart page
//! GET  /cart/count             - Cart count badge (fragment)
//! ```
//!
//! Every handler resolves the shopper's cart first and re-issues the
//! `cart-id` cookie when the resolved id differs from the one sent.

pub mod cart;
pub mod home;
pub mod products;

use axum::{
    Router,
    http::{HeaderMap, HeaderName},
    response::Response,
    routing::get,
};
use medusa_storefront_core::CartId;
use url::Url;

use crate::session::CartIdStore;
use crate::state::AppState;

/// Set by HTMX on every request it issues.
pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");
/// Browser URL at the time of an HTMX request.
pub const HX_CURRENT_URL: HeaderName = HeaderName::from_static("hx-current-url");
/// Replace the browser URL without navigation.
pub const HX_REPLACE_URL: HeaderName = HeaderName::from_static("hx-replace-url");
/// Fire a client-side event after the swap.
pub const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

/// Client-side event fired when the cart changes.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.get(HX_REQUEST).is_some_and(|value| value == "true")
}

/// The browser URL reported by HTMX, falling back to `fallback`.
#[must_use]
pub fn current_url(headers: &HeaderMap, fallback: &Url) -> Url {
    headers
        .get(HX_CURRENT_URL)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| Url::parse(raw).ok())
        .unwrap_or_else(|| fallback.clone())
}

/// Persist `resolved` on the response unless the request already carried it.
pub(crate) fn remember_cart(
    state: &AppState,
    sent: Option<&CartId>,
    resolved: &CartId,
    mut response: Response,
) -> Response {
    if sent != Some(resolved) {
        state.cart_ids().write(response.headers_mut(), resolved);
    }
    response
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new().route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Search/list page and add-to-cart
        .route("/", get(home::index).post(home::add_to_cart))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
}
