//! Cart route handlers.
//!
//! Cart ids live in the `cart-id` cookie and always go through the cart
//! resolver, so a stale cookie is silently replaced.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use super::home::CartCountTemplate;
use super::remember_cart;
use crate::cart::resolve_cart;
use crate::error::Result;
use crate::medusa::{Cart, LineItem};
use crate::pricing::{format_cart_subtotal, format_line_item_price, format_unit_price};
use crate::session::CartIdStore;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub title: String,
    pub thumbnail: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    /// `None` for an empty cart.
    pub subtotal: Option<String>,
    pub item_count: u32,
}

impl From<&LineItem> for CartItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            title: item.title.clone(),
            thumbnail: item.thumbnail.clone(),
            quantity: item.quantity,
            price: format_unit_price(item),
            line_price: format_line_item_price(item),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items.iter().map(CartItemView::from).collect(),
            subtotal: format_cart_subtotal(cart),
            item_count: cart.item_count(),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub item_count: u32,
}

/// Display cart page.
#[instrument(skip(state, headers))]
pub async fn show(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let sent = state.cart_ids().read(&headers);
    let resolved = resolve_cart(sent.as_ref(), state.medusa()).await?;

    let cart = CartView::from(&resolved.cart);
    let response = CartShowTemplate {
        item_count: cart.item_count,
        cart,
    }
    .into_response();

    Ok(remember_cart(&state, sent.as_ref(), &resolved.cart.id, response))
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, headers))]
pub async fn count(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let sent = state.cart_ids().read(&headers);
    let resolved = resolve_cart(sent.as_ref(), state.medusa()).await?;

    let response = CartCountTemplate {
        count: resolved.cart.item_count(),
    }
    .into_response();

    Ok(remember_cart(&state, sent.as_ref(), &resolved.cart.id, response))
}
