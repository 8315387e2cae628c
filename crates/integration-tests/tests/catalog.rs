//! Product listing, detail and quote pages.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use httpmock::prelude::*;
use rentalhub_integration_tests::{TestApp, customer, product, seller};
use serde_json::json;

#[tokio::test]
async fn test_listing_renders_cards_and_next_page_sentinel() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/rentals/products/")
                .query_param("page", "1")
                .query_param("limit", "2");
            then.status(200).json_body(json!({
                "results": [product(1, "PA Speaker", "ravi"), product(2, "Cordless Drill", "ravi")],
                "count": 5
            }));
        })
        .await;

    let response = app.get("/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("PA Speaker"));
    assert!(response.body.contains("Cordless Drill"));
    assert!(response.body.contains("$45.00"));
    assert!(response.body.contains("hx-trigger=\"revealed\""));
    assert!(response.body.contains("/products/page?page=2"));
    // Search and category share one request queue
    assert_eq!(
        response.body.matches("hx-sync=\"closest form:replace\"").count(),
        2
    );
}

#[tokio::test]
async fn test_next_page_is_a_fragment() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/rentals/products/")
                .query_param("page", "3")
                .query_param("search", "tent");
            then.status(200)
                .json_body(json!([product(5, "Camping Tent", "ravi")]));
        })
        .await;

    let response = app.get_htmx("/products/page?page=3&search=tent").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Camping Tent"));
    assert!(!response.body.contains("<html"));
    assert!(!response.body.contains("hx-trigger=\"revealed\""));
}

#[tokio::test]
async fn test_unreachable_backend_shows_sample_catalog() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/rentals/products/");
            then.status(502).body("<html>bad gateway</html>");
        })
        .await;

    let response = app.get("/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("these are sample products"));
    assert!(response.body.contains("Professional DSLR Camera"));

    // Later pages report the failure instead
    let response = app.get_htmx("/products/page?page=2").await;
    assert!(response.body.contains("listing-error"));
    assert!(!response.body.contains("Professional DSLR Camera"));
}

#[tokio::test]
async fn test_product_detail_offers_rental_to_customers() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/rentals/products/5/");
            then.status(200)
                .json_body(product(5, "Party Projector", "ravi"));
        })
        .await;

    let response = app.get("/products/5").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Party Projector"));
    assert!(response.body.contains("Add to wishlist"));
    assert!(response.body.contains("hx-target=\"#quote\" hx-sync=\"this:replace\""));
}

#[tokio::test]
async fn test_sellers_cannot_rent() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(seller()).await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/rentals/products/5/");
            then.status(200)
                .json_body(product(5, "Party Projector", "someone"));
        })
        .await;

    let response = app.get("/products/5").await;
    assert!(response.body.contains("Seller accounts can't rent items."));
    assert!(!response.body.contains("Add to wishlist"));
}

#[tokio::test]
async fn test_sample_products_render_without_backend() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;

    let response = app.get("/products/-1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Professional DSLR Camera"));
    assert!(response.body.contains("Sample products can't be rented."));
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/rentals/products/404/");
            then.status(404).json_body(json!({ "detail": "Not found." }));
        })
        .await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/rentals/products/");
            then.status(200).json_body(json!([]));
        })
        .await;

    let response = app.get("/products/404").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quote_prices_the_rental_period() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/rentals/products/5/");
            then.status(200)
                .json_body(product(5, "Party Projector", "ravi"));
        })
        .await;

    let response = app
        .post_form_htmx(
            "/products/5/quote",
            &[
                ("start_date", "2025-03-01T09:00"),
                ("end_date", "2025-03-04T09:00"),
                ("quantity", "2"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("$270.00"));

    let response = app
        .post_form_htmx(
            "/products/5/quote",
            &[("start_date", "2025-03-04T09:00"), ("end_date", "2025-03-01T09:00")],
        )
        .await;
    assert!(response.body.contains("quote-hint"));
}
