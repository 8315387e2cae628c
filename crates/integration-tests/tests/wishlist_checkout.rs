//! Wishlist mutations and the Razorpay checkout round trip.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use httpmock::Method::PATCH;
use httpmock::prelude::*;
use rentalhub_integration_tests::{TestApp, customer, product};
use serde_json::{Value, json};

fn wishlist_body() -> Value {
    json!([
        {
            "id": 1,
            "product": product(10, "PA Speaker", "ravi"),
            "quantity": 2,
            "start_date": "2025-03-01T09:00:00Z",
            "end_date": "2025-03-04T09:00:00Z"
        },
        { "id": 2, "product": 11, "product_name": "Folding Chairs", "quantity": 1 }
    ])
}

async fn signed_in_with_wishlist() -> TestApp {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/wishlist/");
            then.status(200).json_body(wishlist_body());
        })
        .await;
    app
}

#[tokio::test]
async fn test_wishlist_page_lists_entries_and_summary() {
    let mut app = signed_in_with_wishlist().await;

    let response = app.get("/wishlist").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("PA Speaker"));
    assert!(response.body.contains("Folding Chairs"));
    assert!(response.body.contains("Mar 1, 2025 to Mar 4, 2025"));
    assert!(response.body.contains("Price on request"));
    assert!(response.body.contains("action=\"/wishlist/checkout\""));
    assert!(response.body.contains("hx-sync=\"closest form:replace\""));
}

#[tokio::test]
async fn test_wishlist_search_filters_rows_only() {
    let mut app = signed_in_with_wishlist().await;

    let response = app.get_htmx("/wishlist?search=chair").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.body.contains("<html"));
    assert!(response.body.contains("Folding Chairs"));
    assert!(!response.body.contains("PA Speaker"));
}

#[tokio::test]
async fn test_add_to_wishlist_triggers_update_event() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;
    let add = app
        .backend
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/wishlist/")
                .header("X-CSRFToken", "tok123")
                .json_body_partial(r#"{ "product": 10, "quantity": 2 }"#);
            then.status(201)
                .json_body(json!({ "id": 3, "product": 10, "quantity": 2 }));
        })
        .await;

    let response = app
        .post_form_htmx(
            "/wishlist/add",
            &[
                ("product_id", "10"),
                ("quantity", "2"),
                ("start_date", "2025-03-01T09:00"),
                ("end_date", "2025-03-04T09:00"),
            ],
        )
        .await;

    add.assert_async().await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("hx-trigger"), Some("wishlist-updated"));
    assert!(response.body.contains("Saved to your wishlist"));
}

#[tokio::test]
async fn test_sample_products_are_not_saved() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;

    let response = app
        .post_form_htmx("/wishlist/add", &[("product_id", "-2")])
        .await;
    assert!(response.header("hx-trigger").is_none());
    assert!(response.body.contains("Sample products can"));
}

#[tokio::test]
async fn test_quantity_change_refreshes_fragment() {
    let mut app = signed_in_with_wishlist().await;
    let patch = app
        .backend
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/wishlist/1/")
                .json_body(json!({ "quantity": 5 }));
            then.status(200).json_body(json!({ "id": 1, "quantity": 5 }));
        })
        .await;

    let response = app
        .post_form_htmx("/wishlist/1/quantity", &[("quantity", "5"), ("search", "")])
        .await;

    patch.assert_async().await;
    assert_eq!(response.header("hx-trigger"), Some("wishlist-updated"));
    assert!(response.body.contains("summary-grid"));
    assert!(!response.body.contains("<html"));
}

#[tokio::test]
async fn test_failed_removal_is_reported_inline() {
    let mut app = signed_in_with_wishlist().await;
    app.backend
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/wishlist/9/");
            then.status(404).json_body(json!({ "detail": "Not found." }));
        })
        .await;

    let response = app
        .post_form_htmx("/wishlist/9/remove", &[("search", "")])
        .await;
    assert!(response.header("hx-trigger").is_none());
    assert!(response.body.contains("That item is no longer in your wishlist."));
}

#[tokio::test]
async fn test_checkout_and_verify_round_trip() {
    let mut app = signed_in_with_wishlist().await;
    let create = app
        .backend
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/orders/create/")
                .json_body_partial(r#"{ "items": [{ "product_id": 10, "quantity": 2 }] }"#);
            then.status(201)
                .json_body(json!({ "order_id": "order_ABC", "amount": "90.00" }));
        })
        .await;

    let response = app.post_form("/wishlist/checkout", &[]).await;
    create.assert_async().await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("data-order-id=\"order_ABC\""));
    assert!(response.body.contains("data-amount=\"9000\""));
    assert!(response.body.contains("data-key=\"rzp_test_key\""));
    assert!(response.body.contains("$90.00"));

    let verify = app
        .backend
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/orders/verify/")
                .json_body_partial(r#"{ "razorpay_order_id": "order_ABC", "razorpay_payment_id": "pay_1" }"#);
            then.status(200).json_body(json!({ "message": "Payment verified" }));
        })
        .await;
    let clear = app
        .backend
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/wishlist/1/");
            then.status(204);
        })
        .await;

    let response = app
        .post_form(
            "/orders/verify",
            &[
                ("razorpay_order_id", "order_ABC"),
                ("razorpay_payment_id", "pay_1"),
                ("razorpay_signature", "sig"),
            ],
        )
        .await;
    verify.assert_async().await;
    clear.assert_async().await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Payment successful!"));

    // The pending order is consumed
    let response = app
        .post_form(
            "/orders/verify",
            &[
                ("razorpay_order_id", "order_ABC"),
                ("razorpay_payment_id", "pay_1"),
                ("razorpay_signature", "sig"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_id_only_entries_are_priced_and_checked_out() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/wishlist/");
            then.status(200)
                .json_body(json!([{ "id": 1, "product": 10, "quantity": 2 }]));
        })
        .await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/rentals/products/10/");
            then.status(200).json_body(product(10, "PA Speaker", "ravi"));
        })
        .await;
    let create = app
        .backend
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/orders/create/")
                .json_body_partial(r#"{ "items": [{ "product_id": 10, "quantity": 2 }] }"#);
            then.status(201)
                .json_body(json!({ "order_id": "order_XYZ", "amount": "90.00" }));
        })
        .await;

    let response = app.get("/wishlist").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("PA Speaker"));
    assert!(response.body.contains("$90.00"));
    assert!(!response.body.contains("$0.00"));

    let response = app.post_form("/wishlist/checkout", &[]).await;
    create.assert_async().await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("data-order-id=\"order_XYZ\""));
}

#[tokio::test]
async fn test_verify_rejects_unknown_orders() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;

    let response = app
        .post_form(
            "/orders/verify",
            &[
                ("razorpay_order_id", "order_other"),
                ("razorpay_payment_id", "pay_1"),
                ("razorpay_signature", "sig"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
