//! Cart id persistence between requests.
//!
//! The shopper's cart id travels in a `cart-id` cookie. The value uses the
//! Remix cookie encoding (base64 of the JSON string) so carts created by the
//! previous storefront keep working.

use std::time::Duration;

use axum::http::{HeaderMap, HeaderValue, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cookie::{Cookie, SameSite};

use medusa_storefront_core::CartId;

use crate::config::StorefrontConfig;

/// Cart cookie name.
pub const CART_COOKIE_NAME: &str = "cart-id";

/// Cart cookie lifetime (one week).
pub const CART_COOKIE_MAX_AGE: Duration = Duration::from_secs(604_800);

/// Where a shopper's cart id is kept between requests.
pub trait CartIdStore {
    /// Read the cart id carried by a request, if any.
    fn read(&self, headers: &HeaderMap) -> Option<CartId>;

    /// Persist a cart id on a response.
    fn write(&self, headers: &mut HeaderMap, id: &CartId);
}

/// Cookie-backed [`CartIdStore`].
#[derive(Debug, Clone)]
pub struct CookieCartIdStore {
    name: &'static str,
    max_age: Duration,
    secure: bool,
}

impl CookieCartIdStore {
    /// Store using the `cart-id` cookie with a one week lifetime.
    #[must_use]
    pub const fn new(secure: bool) -> Self {
        Self {
            name: CART_COOKIE_NAME,
            max_age: CART_COOKIE_MAX_AGE,
            secure,
        }
    }

    /// Store configured for the storefront's public URL scheme.
    #[must_use]
    pub fn from_config(config: &StorefrontConfig) -> Self {
        Self::new(config.is_secure())
    }

    /// Build the `Set-Cookie` value for `id`.
    #[must_use]
    pub fn cookie(&self, id: &CartId) -> Cookie<'static> {
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        Cookie::build((self.name, encode_value(id.as_str())))
            .path("/")
            .max_age(cookie::time::Duration::seconds(max_age))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }
}

impl CartIdStore for CookieCartIdStore {
    fn read(&self, headers: &HeaderMap) -> Option<CartId> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse_encoded)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == self.name)
            .and_then(|cookie| decode_value(cookie.value()))
            .filter(|id| !id.is_empty())
            .map(CartId::from)
    }

    fn write(&self, headers: &mut HeaderMap, id: &CartId) {
        let cookie = self.cookie(id).encoded().to_string();
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Cart cookie is not a valid header value"),
        }
    }
}

/// `base64(JSON.stringify(value))`
fn encode_value(id: &str) -> String {
    let json = serde_json::Value::String(id.to_string()).to_string();
    STANDARD.encode(json)
}

/// Inverse of [`encode_value`]; anything undecodable is treated as absent.
fn decode_value(raw: &str) -> Option<String> {
    let bytes = STANDARD.decode(raw).ok()?;
    serde_json::from_slice::<String>(&bytes).ok()
}
