//! Price formatting for commerce entities.
//!
//! Thin adapters from Medusa types to [`format_price`] in the region
//! currency.

use medusa_storefront_core::{FormatPriceOptions, REGION_CURRENCY, format_price};

use crate::medusa::{Cart, LineItem, ProductVariant};

/// Format the variant's price in the region currency.
///
/// Returns `None` when the variant has no price in that currency.
#[must_use]
pub fn format_variant_price(variant: &ProductVariant) -> Option<String> {
    variant
        .prices
        .iter()
        .find(|price| REGION_CURRENCY.matches(&price.currency_code))
        .map(|price| format_price(Some(price.amount), FormatPriceOptions::default()))
}

/// Format a line's total (unit price times quantity).
#[must_use]
pub fn format_line_item_price(item: &LineItem) -> String {
    format_price(
        Some(item.unit_price),
        FormatPriceOptions::with_quantity(item.quantity),
    )
}

/// Format a line's unit price.
#[must_use]
pub fn format_unit_price(item: &LineItem) -> String {
    format_price(Some(item.unit_price), FormatPriceOptions::default())
}

/// Format the cart subtotal. Missing and zero subtotals yield `None`.
#[must_use]
pub fn format_cart_subtotal(cart: &Cart) -> Option<String> {
    cart.subtotal
        .filter(|subtotal| *subtotal != 0)
        .map(|subtotal| format_price(Some(subtotal), FormatPriceOptions::default()))
}
