//! Cart commands.

use medusa_storefront::medusa::{Cart, MedusaClient};
use medusa_storefront::pricing::{format_cart_subtotal, format_line_item_price};
use medusa_storefront_core::{CartId, VariantId};

use super::CliError;

/// Create an empty cart and print its id.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn create(client: &MedusaClient) -> Result<(), CliError> {
    let cart = client.create_cart().await?;
    print_cart(&cart);
    Ok(())
}

/// Print a cart's lines and subtotal.
///
/// # Errors
///
/// Returns an error if the cart does not exist or the API request fails.
pub async fn show(client: &MedusaClient, id: &str) -> Result<(), CliError> {
    let cart = client.retrieve_cart(&CartId::new(id)).await?;
    print_cart(&cart);
    Ok(())
}

/// Add `quantity` units of a variant and print the updated cart.
///
/// # Errors
///
/// Returns an error if the cart or variant does not exist or the API
/// request fails.
pub async fn add(
    client: &MedusaClient,
    cart_id: &str,
    variant_id: &str,
    quantity: u32,
) -> Result<(), CliError> {
    let cart = client
        .add_line_item(&CartId::new(cart_id), &VariantId::new(variant_id), quantity)
        .await?;
    print_cart(&cart);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart) {
    for line in render(cart) {
        println!("{line}");
    }
}

fn render(cart: &Cart) -> Vec<String> {
    let mut lines = vec![format!("Cart {} ({} items)", cart.id, cart.item_count())];
    lines.extend(cart.items.iter().map(|item| {
        format!(
            "  {} x{}\t{}",
            item.title,
            item.quantity,
            format_line_item_price(item)
        )
    }));
    if let Some(subtotal) = format_cart_subtotal(cart) {
        lines.push(format!("Subtotal: {subtotal}"));
    }
    lines
}
