//! Catalog commands.

use medusa_storefront::medusa::{MedusaClient, Product, ProductListParams};
use medusa_storefront::pricing::format_variant_price;
use medusa_storefront_core::ProductId;
use tracing::info;

use super::CliError;

/// List products, optionally filtered by `term`.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[allow(clippy::print_stdout)]
pub async fn list(
    client: &MedusaClient,
    term: &str,
    limit: u32,
    offset: u32,
    json: bool,
) -> Result<(), CliError> {
    let params = ProductListParams {
        limit,
        offset,
        ..ProductListParams::search(term)
    };
    let page = client.list_products(&params).await?;
    info!(count = page.count, "Fetched product page");

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    for product in &page.products {
        println!("{}", summary_line(product));
    }
    println!(
        "{} of {} products (offset {})",
        page.products.len(),
        page.count,
        page.offset
    );
    Ok(())
}

/// Show one product and its variants.
///
/// # Errors
///
/// Returns an error if the product does not exist or the API request fails.
#[allow(clippy::print_stdout)]
pub async fn show(client: &MedusaClient, id: &str, json: bool) -> Result<(), CliError> {
    let product = client.retrieve_product(&ProductId::new(id)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
        return Ok(());
    }

    println!("{} ({})", product.title, product.id);
    if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{description}");
    }
    for variant in &product.variants {
        let price = format_variant_price(variant).unwrap_or_else(|| "-".to_string());
        println!("  {}\t{}\t{}", variant.id, variant.title, price);
    }
    Ok(())
}

/// `id  title  price` for a listing.
pub(crate) fn summary_line(product: &Product) -> String {
    let price = product
        .primary_variant()
        .and_then(format_variant_price)
        .unwrap_or_else(|| "-".to_string());
    format!("{}\t{}\t{}", product.id, product.title, price)
}
