//! Integration tests for the Medusa storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p medusa-storefront-integration-tests
//! ```
//!
//! Each test gets a [`TestContext`]: a `wiremock` server standing in for the
//! Medusa store API and the real storefront router bound to an ephemeral
//! port. No external services are needed.

use cookie::Cookie;
use medusa_storefront::config::StorefrontConfig;
use medusa_storefront::session::{CartIdStore, CookieCartIdStore};
use medusa_storefront::state::AppState;
use medusa_storefront_core::CartId;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue, SET_COOKIE};
use reqwest::redirect::Policy;
use serde_json::{Value, json};
use wiremock::MockServer;

/// A running storefront wired to a mock Medusa server.
pub struct TestContext {
    /// Mock Medusa store API.
    pub medusa: MockServer,
    /// HTTP client without cookie store or redirect following.
    pub client: reqwest::Client,
    base_url: String,
}

impl TestContext {
    /// Start the mock backend and the storefront.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be configured or bound.
    pub async fn new() -> Self {
        let medusa = MockServer::start().await;
        let medusa_url = medusa.uri();

        let config = StorefrontConfig::from_lookup(|key| match key {
            "PUBLIC_MEDUSA_URL" => Some(medusa_url.clone()),
            "MEDUSA_MAX_RETRIES" => Some("0".to_string()),
            "MEDUSA_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .expect("test configuration is valid");
        let state = AppState::new(config).expect("Medusa client builds");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("listener has an address");
        tokio::spawn(async move {
            axum::serve(listener, medusa_storefront::app(state))
                .await
                .expect("storefront server");
        });

        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .expect("reqwest client builds");

        Self {
            medusa,
            client,
            base_url: format!("http://{addr}"),
        }
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// `Cookie` header value carrying `cart_id` the way the storefront sets it.
#[must_use]
pub fn cart_cookie(cart_id: &str) -> String {
    CookieCartIdStore::new(false)
        .cookie(&CartId::new(cart_id))
        .encoded()
        .stripped()
        .to_string()
}

/// Cart id carried by a response's `Set-Cookie`, if any.
#[must_use]
pub fn set_cart_cookie(response: &reqwest::Response) -> Option<CartId> {
    let store = CookieCartIdStore::new(false);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|raw| Cookie::parse_encoded(raw.to_string()).ok())
        .find_map(|cookie| {
            let echoed = HeaderValue::from_str(&cookie.encoded().stripped().to_string()).ok()?;
            let mut headers = HeaderMap::new();
            headers.insert(COOKIE, echoed);
            store.read(&headers)
        })
}

/// A product with one USD-priced variant per `(variant_id, amount)`.
#[must_use]
pub fn product_json(id: &str, title: &str, variants: &[(&str, i64)]) -> Value {
    json!({
        "id": id,
        "title": title,
        "handle": title.to_lowercase().replace(' ', "-"),
        "thumbnail": null,
        "variants": variants
            .iter()
            .map(|(variant_id, amount)| json!({
                "id": variant_id,
                "title": "Default",
                "prices": [{"currency_code": "usd", "amount": amount}]
            }))
            .collect::<Vec<_>>()
    })
}

/// `GET /store/products` response body.
#[must_use]
pub fn product_page_json(products: Vec<Value>) -> Value {
    json!({
        "count": products.len(),
        "offset": 0,
        "limit": 100,
        "products": products
    })
}

/// Cart response body with `(title, quantity, unit_price)` lines.
#[must_use]
pub fn cart_json(id: &str, lines: &[(&str, u32, i64)]) -> Value {
    let items: Vec<Value> = lines
        .iter()
        .enumerate()
        .map(|(index, (title, quantity, unit_price))| {
            json!({
                "id": format!("item_{index}"),
                "title": title,
                "quantity": quantity,
                "unit_price": unit_price
            })
        })
        .collect();
    let subtotal: i64 = lines
        .iter()
        .map(|(_, quantity, unit_price)| i64::from(*quantity) * unit_price)
        .sum();

    json!({"cart": {"id": id, "items": items, "subtotal": subtotal}})
}
