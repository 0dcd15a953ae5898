//! Subcommand implementations.

pub mod cart;
pub mod price;
pub mod products;
pub mod search;

use medusa_storefront::config::{ConfigError, StorefrontConfig};
use medusa_storefront::medusa::{MedusaClient, MedusaError};
use medusa_storefront::search::LiveSearchClosed;
use medusa_storefront_core::UnknownCurrency;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Medusa error: {0}")]
    Medusa(#[from] MedusaError),

    #[error(transparent)]
    Currency(#[from] UnknownCurrency),

    #[error(transparent)]
    Search(#[from] LiveSearchClosed),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Build a Medusa client from the storefront environment.
pub fn client() -> Result<MedusaClient, CliError> {
    let config = StorefrontConfig::from_env()?;
    Ok(MedusaClient::new(&config.medusa)?)
}
