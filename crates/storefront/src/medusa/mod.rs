//! Medusa store API client.
//!
//! # Architecture
//!
//! - Plain REST/JSON over `reqwest`, one method per store endpoint
//! - The Medusa server is the source of truth - NO local sync, direct API calls
//! - Transient failures (network, 429, 5xx) are retried with exponential backoff
//! - Product lookups are cached in memory via `moka` (5 minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use medusa_storefront::medusa::{MedusaClient, ProductListParams};
//!
//! let client = MedusaClient::new(&config.medusa)?;
//!
//! let page = client.list_products(&ProductListParams::search("shirt")).await?;
//! let cart = client.create_cart().await?;
//! let cart = client
//!     .add_line_item(&cart.id, &page.products[0].variants[0].id, 1)
//!     .await?;
//! ```

mod client;
mod retry;
pub mod types;

pub use client::MedusaClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the Medusa store API.
#[derive(Debug, Error)]
pub enum MedusaError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the commerce backend (HTTP 429).
    #[error("Rate limited by commerce API")]
    RateLimited,

    /// Any other non-success status.
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl MedusaError {
    /// Whether the failure is transient and worth retrying.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited => true,
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::Decode { .. } | Self::InvalidUrl(_) => false,
        }
    }

    /// Whether the backend reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
