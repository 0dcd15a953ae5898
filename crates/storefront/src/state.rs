//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::medusa::{MedusaClient, MedusaError};
use crate::session::CookieCartIdStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the Medusa client and the cart id store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    medusa: MedusaClient,
    cart_ids: CookieCartIdStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Medusa HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, MedusaError> {
        let medusa = MedusaClient::new(&config.medusa)?;
        let cart_ids = CookieCartIdStore::from_config(&config);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                medusa,
                cart_ids,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Medusa store API client.
    #[must_use]
    pub fn medusa(&self) -> &MedusaClient {
        &self.inner.medusa
    }

    /// Get a reference to the cart id store.
    #[must_use]
    pub fn cart_ids(&self) -> &CookieCartIdStore {
        &self.inner.cart_ids
    }
}
