//! End-to-end tests for the storefront pages against a mock Medusa backend.

#![allow(clippy::unwrap_used)]

use medusa_storefront_core::CartId;
use medusa_storefront_integration_tests::{
    TestContext, cart_cookie, cart_json, product_json, product_page_json, set_cart_cookie,
};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, ResponseTemplate};

async fn mock_new_cart(ctx: &TestContext, id: &str) {
    Mock::given(method("POST"))
        .and(path("/store/carts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(id, &[])))
        .expect(1)
        .mount(&ctx.medusa)
        .await;
}

async fn mock_existing_cart(ctx: &TestContext, id: &str, lines: &[(&str, u32, i64)]) {
    Mock::given(method("GET"))
        .and(path(format!("/store/carts/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(id, lines)))
        .mount(&ctx.medusa)
        .await;
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;

    let resp = ctx.client.get(ctx.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_empty_term_lists_first_page_unfiltered() {
    let ctx = TestContext::new().await;
    mock_new_cart(&ctx, "cart_new").await;
    Mock::given(method("GET"))
        .and(path("/store/products"))
        .and(query_param("limit", "100"))
        .and(query_param("offset", "0"))
        .and(query_param_is_missing("q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_page_json(vec![
            product_json("prod_1", "Medusa T-Shirt", &[("variant_1", 1950)]),
            product_json("prod_2", "Medusa Sweatpants", &[("variant_2", 2950)]),
        ])))
        .expect(1)
        .mount(&ctx.medusa)
        .await;

    let resp = ctx.client.get(ctx.url("/?term=")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(set_cart_cookie(&resp), Some(CartId::new("cart_new")));
    let html = resp.text().await.unwrap();
    assert!(html.contains("<html"));
    assert!(html.contains("Items in cart: 0"));
    assert!(html.contains("Medusa T-Shirt"));
    assert!(html.contains("$29.50"));
    assert!(html.contains(r#"name="cartId" value="cart_new""#));
    assert!(html.contains(r#"hx-trigger="input changed delay:200ms"#));
}

#[tokio::test]
async fn test_htmx_search_returns_fragment_and_replaces_url() {
    let ctx = TestContext::new().await;
    mock_existing_cart(&ctx, "cart_01", &[]).await;
    Mock::given(method("GET"))
        .and(path("/store/products"))
        .and(query_param("q", "shirt"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_page_json(vec![
            product_json("prod_1", "Medusa T-Shirt", &[("variant_1", 1950)]),
        ])))
        .expect(1)
        .mount(&ctx.medusa)
        .await;

    let resp = ctx
        .client
        .get(ctx.url("/?term=shirt"))
        .header("Cookie", cart_cookie("cart_01"))
        .header("HX-Request", "true")
        .header("HX-Current-URL", ctx.url("/?term=shi"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("hx-replace-url").unwrap(), "/?term=shirt");
    // The cookie already names a live cart.
    assert_eq!(set_cart_cookie(&resp), None);
    let html = resp.text().await.unwrap();
    assert!(html.starts_with(r#"<div id="product-grid">"#));
    assert!(!html.contains("<html"));
    assert!(html.contains("Medusa T-Shirt"));
}

#[tokio::test]
async fn test_htmx_search_keeps_term_as_typed() {
    let ctx = TestContext::new().await;
    mock_existing_cart(&ctx, "cart_01", &[]).await;
    Mock::given(method("GET"))
        .and(path("/store/products"))
        .and(query_param("q", "blue shirt "))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_page_json(vec![])))
        .expect(1)
        .mount(&ctx.medusa)
        .await;

    let resp = ctx
        .client
        .get(ctx.url("/?term=blue+shirt+"))
        .header("Cookie", cart_cookie("cart_01"))
        .header("HX-Request", "true")
        .header("HX-Current-URL", ctx.url("/?term=blue+shirt"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("hx-replace-url").unwrap(),
        "/?term=blue+shirt+"
    );
}

#[tokio::test]
async fn test_htmx_empty_search_clears_term_from_url() {
    let ctx = TestContext::new().await;
    mock_existing_cart(&ctx, "cart_01", &[]).await;
    Mock::given(method("GET"))
        .and(path("/store/products"))
        .and(query_param_is_missing("q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_page_json(vec![])))
        .mount(&ctx.medusa)
        .await;

    let resp = ctx
        .client
        .get(ctx.url("/?term="))
        .header("Cookie", cart_cookie("cart_01"))
        .header("HX-Request", "true")
        .header("HX-Current-URL", ctx.url("/?term=shirt"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.headers().get("hx-replace-url").unwrap(), "/");
}

#[tokio::test]
async fn test_stale_cart_cookie_is_replaced() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/store/carts/cart_gone"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"type": "not_found", "message": "Cart with id: cart_gone was not found"})),
        )
        .expect(1)
        .mount(&ctx.medusa)
        .await;
    mock_new_cart(&ctx, "cart_fresh").await;

    let resp = ctx
        .client
        .get(ctx.url("/cart"))
        .header("Cookie", cart_cookie("cart_gone"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(set_cart_cookie(&resp), Some(CartId::new("cart_fresh")));
    assert!(resp.text().await.unwrap().contains("Your cart is empty"));
}

#[tokio::test]
async fn test_add_to_cart_htmx_reflects_quantity() {
    let ctx = TestContext::new().await;
    mock_existing_cart(&ctx, "cart_01", &[]).await;
    Mock::given(method("GET"))
        .and(path("/store/products/prod_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "product": product_json("prod_1", "Medusa T-Shirt", &[("variant_s", 1950), ("variant_m", 1950)])
        })))
        .mount(&ctx.medusa)
        .await;
    Mock::given(method("POST"))
        .and(path("/store/carts/cart_01/line-items"))
        .and(body_json(json!({"variant_id": "variant_s", "quantity": 1})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cart_json("cart_01", &[("Medusa T-Shirt", 1, 1950)])),
        )
        .expect(1)
        .mount(&ctx.medusa)
        .await;

    let resp = ctx
        .client
        .post(ctx.url("/"))
        .header("HX-Request", "true")
        .form(&[("productId", "prod_1"), ("cartId", "cart_01")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("hx-trigger").unwrap(), "cart-updated");
    // The request carried no cookie, so the form's cart is persisted.
    assert_eq!(set_cart_cookie(&resp), Some(CartId::new("cart_01")));
    assert!(resp.text().await.unwrap().contains("Items in cart: 1"));
}

#[tokio::test]
async fn test_add_to_cart_form_falls_back_to_cookie_and_redirects() {
    let ctx = TestContext::new().await;
    mock_existing_cart(&ctx, "cart_cookie", &[("Medusa Mug", 1, 1200)]).await;
    Mock::given(method("GET"))
        .and(path("/store/products/prod_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "product": product_json("prod_2", "Medusa Mug", &[("variant_mug", 1200)])
        })))
        .mount(&ctx.medusa)
        .await;
    Mock::given(method("POST"))
        .and(path("/store/carts/cart_cookie/line-items"))
        .and(body_json(json!({"variant_id": "variant_mug", "quantity": 1})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cart_json("cart_cookie", &[("Medusa Mug", 2, 1200)])),
        )
        .expect(1)
        .mount(&ctx.medusa)
        .await;

    let resp = ctx
        .client
        .post(ctx.url("/"))
        .header("Cookie", cart_cookie("cart_cookie"))
        .form(&[("productId", "prod_2"), ("cartId", "")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get("location").unwrap(), "/");
    assert_eq!(set_cart_cookie(&resp), None);
}

#[tokio::test]
async fn test_add_to_cart_form_redirect_keeps_search_term() {
    let ctx = TestContext::new().await;
    mock_existing_cart(&ctx, "cart_01", &[]).await;
    Mock::given(method("GET"))
        .and(path("/store/products/prod_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "product": product_json("prod_1", "Medusa T-Shirt", &[("variant_s", 1950)])
        })))
        .mount(&ctx.medusa)
        .await;
    Mock::given(method("POST"))
        .and(path("/store/carts/cart_01/line-items"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cart_json("cart_01", &[("Medusa T-Shirt", 1, 1950)])),
        )
        .mount(&ctx.medusa)
        .await;

    let resp = ctx
        .client
        .post(ctx.url("/"))
        .form(&[("productId", "prod_1"), ("cartId", "cart_01"), ("term", "shirt")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get("location").unwrap(), "/?term=shirt");
}

#[tokio::test]
async fn test_add_unknown_variant_is_not_found_and_refetches_product() {
    let ctx = TestContext::new().await;
    mock_existing_cart(&ctx, "cart_01", &[]).await;
    Mock::given(method("GET"))
        .and(path("/store/products/prod_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "product": product_json("prod_1", "Medusa T-Shirt", &[("variant_gone", 1950)])
        })))
        .expect(2)
        .mount(&ctx.medusa)
        .await;
    Mock::given(method("POST"))
        .and(path("/store/carts/cart_01/line-items"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "type": "not_found",
            "message": "Variant with id: variant_gone was not found"
        })))
        .mount(&ctx.medusa)
        .await;

    for _ in 0..2 {
        let resp = ctx
            .client
            .post(ctx.url("/"))
            .form(&[("productId", "prod_1"), ("cartId", "cart_01")])
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.text().await.unwrap().contains("variant_gone"));
    }
}

#[tokio::test]
async fn test_add_product_without_variants_is_bad_request() {
    let ctx = TestContext::new().await;
    mock_existing_cart(&ctx, "cart_01", &[]).await;
    Mock::given(method("GET"))
        .and(path("/store/products/prod_gift"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "product": product_json("prod_gift", "Gift Card", &[])
        })))
        .mount(&ctx.medusa)
        .await;

    let resp = ctx
        .client
        .post(ctx.url("/"))
        .form(&[("productId", "prod_gift"), ("cartId", "cart_01")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_detail_and_missing_product() {
    let ctx = TestContext::new().await;
    mock_existing_cart(&ctx, "cart_01", &[]).await;
    Mock::given(method("GET"))
        .and(path("/store/products/prod_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "product": product_json("prod_1", "Medusa T-Shirt", &[("variant_s", 1950), ("variant_l", 2150)])
        })))
        .mount(&ctx.medusa)
        .await;
    Mock::given(method("GET"))
        .and(path("/store/products/prod_missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Product not found"})),
        )
        .mount(&ctx.medusa)
        .await;

    let resp = ctx
        .client
        .get(ctx.url("/products/prod_1"))
        .header("Cookie", cart_cookie("cart_01"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();
    assert!(html.contains("$19.50"));
    assert!(html.contains("$21.50"));

    let resp = ctx
        .client
        .get(ctx.url("/products/prod_missing"))
        .header("Cookie", cart_cookie("cart_01"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_page_and_count() {
    let ctx = TestContext::new().await;
    mock_existing_cart(
        &ctx,
        "cart_01",
        &[("Medusa T-Shirt", 2, 1950), ("Medusa Mug", 1, 1200)],
    )
    .await;

    let resp = ctx
        .client
        .get(ctx.url("/cart"))
        .header("Cookie", cart_cookie("cart_01"))
        .send()
        .await
        .unwrap();
    let html = resp.text().await.unwrap();
    assert!(html.contains("$39.00"));
    assert!(html.contains("Subtotal: $51.00"));
    assert!(html.contains("Items in cart: 3"));

    let resp = ctx
        .client
        .get(ctx.url("/cart/count"))
        .header("Cookie", cart_cookie("cart_01"))
        .send()
        .await
        .unwrap();
    assert!(resp.text().await.unwrap().contains("Items in cart: 3"));
}

#[tokio::test]
async fn test_backend_outage_is_bad_gateway() {
    let ctx = TestContext::new().await;
    mock_existing_cart(&ctx, "cart_01", &[]).await;
    Mock::given(method("GET"))
        .and(path("/store/products"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&ctx.medusa)
        .await;

    let resp = ctx
        .client
        .get(ctx.url("/"))
        .header("Cookie", cart_cookie("cart_01"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(resp.text().await.unwrap(), "External service error");
}
