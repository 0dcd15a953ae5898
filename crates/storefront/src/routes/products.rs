//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use medusa_storefront_core::ProductId;
use tracing::instrument;

use super::remember_cart;
use crate::cart::resolve_cart;
use crate::error::Result;
use crate::medusa::{Product, ProductVariant};
use crate::pricing::format_variant_price;
use crate::session::CartIdStore;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub variants: Vec<VariantView>,
}

/// Variant display data for templates.
#[derive(Clone)]
pub struct VariantView {
    pub id: String,
    pub title: String,
    pub price: Option<String>,
}

impl From<&ProductVariant> for VariantView {
    fn from(variant: &ProductVariant) -> Self {
        Self {
            id: variant.id.to_string(),
            title: variant.title.clone(),
            price: format_variant_price(variant),
        }
    }
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            description: product.description.clone().filter(|d| !d.is_empty()),
            thumbnail: product.thumbnail.clone(),
            variants: product.variants.iter().map(VariantView::from).collect(),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
    pub cart_id: String,
    pub item_count: u32,
}

/// Display product detail page.
#[instrument(skip(state, headers))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let sent = state.cart_ids().read(&headers);
    let resolved = resolve_cart(sent.as_ref(), state.medusa()).await?;

    let product = state.medusa().retrieve_product(&ProductId::new(id)).await?;

    let response = ProductShowTemplate {
        product: ProductView::from(&product),
        cart_id: resolved.cart.id.to_string(),
        item_count: resolved.cart.item_count(),
    }
    .into_response();

    Ok(remember_cart(&state, sent.as_ref(), &resolved.cart.id, response))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_view_lists_every_variant() {
        let product: Product = serde_json::from_value(json!({
            "id": "prod_1",
            "title": "Medusa Sweatshirt",
            "description": "",
            "variants": [
                {"id": "variant_s", "title": "S", "prices": [{"currency_code": "usd", "amount": 3500}]},
                {"id": "variant_xl", "title": "XL", "prices": [{"currency_code": "eur", "amount": 3200}]}
            ]
        }))
        .unwrap();

        let view = ProductView::from(&product);

        assert_eq!(view.description, None);
        assert_eq!(view.variants.len(), 2);
        assert_eq!(view.variants[0].price.as_deref(), Some("$35.00"));
        assert_eq!(view.variants[1].title, "XL");
        assert_eq!(view.variants[1].price, None);
    }

    #[test]
    fn test_show_template_renders_variants() {
        let html = ProductShowTemplate {
            product: ProductView {
                id: "prod_1".to_string(),
                title: "Medusa Sweatshirt".to_string(),
                description: Some("Reimagine the feeling of a classic sweatshirt.".to_string()),
                thumbnail: None,
                variants: vec![VariantView {
                    id: "variant_s".to_string(),
                    title: "S".to_string(),
                    price: Some("$35.00".to_string()),
                }],
            },
            cart_id: "cart_01".to_string(),
            item_count: 2,
        }
        .render()
        .unwrap();

        assert!(html.contains("Medusa Sweatshirt"));
        assert!(html.contains("$35.00"));
        assert!(html.contains("Items in cart: 2"));
        assert!(html.contains(r#"name="productId" value="prod_1""#));
    }
}
