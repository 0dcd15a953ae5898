//! Product search/list page and add-to-cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use medusa_storefront_core::{CartId, ProductId};
use serde::Deserialize;
use tracing::instrument;

use super::{
    CART_UPDATED_EVENT, HX_REPLACE_URL, HX_TRIGGER, current_url, is_htmx, remember_cart,
};
use crate::cart::resolve_cart;
use crate::error::{AppError, Result};
use crate::medusa::{Product, ProductListParams};
use crate::pricing::format_variant_price;
use crate::search::{path_and_query, search_location};
use crate::session::CartIdStore;
use crate::state::AppState;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub price: Option<String>,
    /// Products without variants cannot be added to the cart.
    pub purchasable: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let variant = product.primary_variant();
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            thumbnail: product.thumbnail.clone(),
            price: variant.and_then(format_variant_price),
            purchasable: variant.is_some(),
        }
    }
}

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub term: String,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    #[serde(rename = "productId")]
    pub product_id: String,
    #[serde(rename = "cartId", default)]
    pub cart_id: String,
    /// Search term of the page the form was posted from.
    #[serde(default)]
    pub term: String,
}

/// Search/list page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub term: String,
    pub products: Vec<ProductCardView>,
    pub total: u64,
    pub cart_id: String,
    pub item_count: u32,
}

/// Product grid fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub term: String,
    pub products: Vec<ProductCardView>,
    pub total: u64,
    pub cart_id: String,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display the product list, filtered by `term`.
///
/// HTMX requests get the grid fragment and an `HX-Replace-Url` header so the
/// address bar tracks the term.
#[instrument(skip(state, query, headers), fields(term = %query.term))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let sent = state.cart_ids().read(&headers);
    let resolved = resolve_cart(sent.as_ref(), state.medusa()).await?;

    let page = state
        .medusa()
        .list_products(&ProductListParams::search(&query.term))
        .await?;
    let products = page.products.iter().map(ProductCardView::from).collect();
    let cart_id = resolved.cart.id.to_string();

    let response = if is_htmx(&headers) {
        let location = search_location(
            &current_url(&headers, &state.config().base_url),
            &query.term,
        );
        (
            AppendHeaders([(HX_REPLACE_URL, path_and_query(&location))]),
            ProductGridTemplate {
                term: query.term,
                products,
                total: page.count,
                cart_id,
            },
        )
            .into_response()
    } else {
        ProductsIndexTemplate {
            term: query.term,
            products,
            total: page.count,
            cart_id,
            item_count: resolved.cart.item_count(),
        }
        .into_response()
    };

    Ok(remember_cart(&state, sent.as_ref(), &resolved.cart.id, response))
}

/// Add a product's primary variant to the cart.
///
/// The cart id comes from the form, falling back to the cookie; either way
/// it goes through the resolver so stale ids are replaced. Plain form posts
/// are redirected back to the list with the shopper's `term` intact.
#[instrument(skip(state, headers, form), fields(product_id = %form.product_id))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id.trim());
    if product_id.is_empty() {
        return Err(AppError::BadRequest("productId is required".to_string()));
    }

    let sent = state.cart_ids().read(&headers);
    let requested = Some(CartId::new(form.cart_id.trim()))
        .filter(|id| !id.is_empty())
        .or_else(|| sent.clone());
    let resolved = resolve_cart(requested.as_ref(), state.medusa()).await?;

    let product = state.medusa().retrieve_product(&product_id).await?;
    let variant = product
        .primary_variant()
        .ok_or_else(|| AppError::BadRequest(format!("Product {} has no variants", product.id)))?;

    let cart = match state
        .medusa()
        .add_line_item(&resolved.cart.id, &variant.id, 1)
        .await
    {
        Ok(cart) => cart,
        // The cached product still lists a variant the backend has dropped
        Err(e) if e.is_not_found() => {
            state.medusa().invalidate_product(&product.id).await;
            return Err(AppError::NotFound(format!(
                "Variant {} is no longer available",
                variant.id
            )));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(
        cart_id = %cart.id,
        variant_id = %variant.id,
        item_count = cart.item_count(),
        "Added item to cart"
    );

    let response = if is_htmx(&headers) {
        (
            AppendHeaders([(HX_TRIGGER, CART_UPDATED_EVENT)]),
            CartCountTemplate {
                count: cart.item_count(),
            },
        )
            .into_response()
    } else {
        let back = search_location(&state.config().base_url, &form.term);
        Redirect::to(&path_and_query(&back)).into_response()
    };

    Ok(remember_cart(&state, sent.as_ref(), &cart.id, response))
}
