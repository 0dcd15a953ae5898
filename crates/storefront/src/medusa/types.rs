//! Domain types for the Medusa store API.
//!
//! Only the fields the storefront renders are modelled; unknown fields are
//! ignored. Amounts are integer minor units (cents).

use medusa_storefront_core::{CartId, LineItemId, ProductId, VariantId};
use serde::{Deserialize, Serialize};

/// Default page size for product listings.
pub const PRODUCT_PAGE_SIZE: u32 = 100;

// =============================================================================
// Product Types
// =============================================================================

/// A single price of a variant in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyAmount {
    /// Lowercase ISO 4217 code, e.g. `usd`.
    pub currency_code: String,
    /// Amount in minor units.
    pub amount: i64,
}

/// A purchasable configuration of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    #[serde(default)]
    pub title: String,
    /// Search results may omit prices entirely.
    #[serde(default)]
    pub prices: Vec<MoneyAmount>,
}

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// The variant added to the cart from listing pages.
    #[must_use]
    pub fn primary_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }
}

/// One page of a product listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Total number of matching products.
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
}

/// Query for `GET /store/products`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListParams {
    /// Free-text filter; empty terms are not sent.
    pub q: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ProductListParams {
    fn default() -> Self {
        Self {
            q: None,
            limit: PRODUCT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl ProductListParams {
    /// First page filtered by a search term, sent as typed. An empty term
    /// lists everything.
    #[must_use]
    pub fn search(term: &str) -> Self {
        Self {
            q: (!term.is_empty()).then(|| term.to_string()),
            ..Self::default()
        }
    }

    /// Query pairs in the order the API documents them.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            pairs.push(("q", q.to_string()));
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        pairs
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// A line in a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
    /// Price of a single unit in minor units.
    #[serde(default)]
    pub unit_price: i64,
}

/// A shopper's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Computed by the backend; absent on freshly created carts.
    #[serde(default)]
    pub subtotal: Option<i64>,
}

impl Cart {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Body of `POST /store/carts/{id}/line-items`.
#[derive(Debug, Clone, Serialize)]
pub struct LineItemInput<'a> {
    pub variant_id: &'a VariantId,
    pub quantity: u32,
}

// =============================================================================
// Response Envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ProductResponse {
    pub product: Product,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartResponse {
    pub cart: Cart,
}

/// Error body returned by the API (`{"type": "...", "message": "..."}`).
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
