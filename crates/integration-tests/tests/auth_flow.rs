//! Sign-in, sign-out and access control through the full router.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use httpmock::prelude::*;
use rentalhub_integration_tests::{TestApp, customer, seller};
use serde_json::json;

#[tokio::test]
async fn test_health_is_public() {
    let mut app = TestApp::spawn().await;
    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_pages_carry_security_headers() {
    let mut app = TestApp::spawn().await;
    let response = app.get("/auth/login").await;

    assert_eq!(response.status, StatusCode::OK);
    let csp = response.header("content-security-policy").unwrap();
    assert!(csp.contains("https://checkout.razorpay.com"));
    assert!(csp.contains("'nonce-"));
    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
    assert!(response.header("x-request-id").is_some());
}

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let mut app = TestApp::spawn().await;

    for path in ["/products", "/wishlist", "/account", "/profile/complete"] {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.location(), Some("/auth/login"), "{path}");
    }

    let response = app.get_htmx("/products/page?page=2").await;
    assert_eq!(response.header("hx-redirect"), Some("/auth/login"));
}

#[tokio::test]
async fn test_customer_login_lands_on_products() {
    let mut app = TestApp::spawn().await;
    let response = app.sign_in_as(customer()).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/products"));

    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/customer/transactions/");
            then.status(200).json_body(json!([]));
        })
        .await;
    let account = app.get("/account").await;
    assert_eq!(account.status, StatusCode::OK);
    assert!(account.body.contains("Asha Rao"));
    assert!(account.body.contains("asha@example.com"));
}

#[tokio::test]
async fn test_seller_login_lands_on_dashboard() {
    let mut app = TestApp::spawn().await;
    let response = app.sign_in_as(seller()).await;
    assert_eq!(response.location(), Some("/seller"));
}

#[tokio::test]
async fn test_incomplete_profile_goes_to_profile_step() {
    let mut app = TestApp::spawn().await;
    let response = app
        .sign_in_as(json!({ "id": 9, "username": "asha", "email": "asha@example.com" }))
        .await;
    assert_eq!(response.location(), Some("/profile/complete"));

    let page = app.get("/profile/complete").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("data-role-picker"));
}

#[tokio::test]
async fn test_login_errors_rerender_the_form() {
    let mut app = TestApp::spawn().await;

    let response = app
        .post_form("/auth/login", &[("username", ""), ("password", "")])
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Username is required"));

    app.mock_csrf().await;
    app.backend
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/login/");
            then.status(400)
                .json_body(json!({ "non_field_errors": ["Invalid credentials"] }));
        })
        .await;
    let response = app
        .post_form("/auth/login", &[("username", "asha"), ("password", "nope")])
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Invalid credentials"));
    assert!(response.body.contains("value=\"asha\""));
}

#[tokio::test]
async fn test_logout_ends_both_sessions() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;

    let logout = app
        .backend
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/logout/")
                .header("X-CSRFToken", "tok123");
            then.status(200).json_body(json!({ "detail": "Logged out" }));
        })
        .await;

    let response = app.post_form("/auth/logout", &[]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/auth/login?notice=signed_out"));
    logout.assert_async().await;

    let response = app.get("/wishlist").await;
    assert_eq!(response.location(), Some("/auth/login"));
}

#[tokio::test]
async fn test_customers_cannot_open_seller_pages() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;

    let response = app.get("/seller").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expired_backend_session_sends_user_to_login() {
    let mut app = TestApp::spawn().await;
    app.sign_in_as(customer()).await;

    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/wishlist/");
            then.status(403).json_body(json!({
                "detail": "Authentication credentials were not provided."
            }));
        })
        .await;

    let response = app.get("/wishlist").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/auth/login"));
}

fn signup_fields(role: &'static str) -> [(&'static str, &'static str); 7] {
    [
        ("full_name", "Ravi Kumar"),
        ("username", "ravi"),
        ("email", "ravi@example.com"),
        ("password", "Secret123"),
        ("confirm_password", "Secret123"),
        ("agree_terms", "on"),
        ("role", role),
    ]
}

#[tokio::test]
async fn test_signup_continues_to_profile_step() {
    let mut app = TestApp::spawn().await;
    app.mock_csrf().await;
    let register = app
        .backend
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/register/")
                .header("X-CSRFToken", "tok123")
                .json_body_partial(r#"{ "username": "ravi", "name": "Ravi Kumar" }"#);
            then.status(201)
                .header("Set-Cookie", "sessionid=sess456; Path=/; HttpOnly")
                .json_body(json!({ "id": 8, "username": "ravi", "email": "ravi@example.com" }));
        })
        .await;

    let response = app.post_form("/auth/signup", &signup_fields("seller")).await;
    register.assert_async().await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/profile/complete"));

    let page = app.get("/profile/complete").await;
    assert_eq!(page.status, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_backend_errors_land_on_the_form_fields() {
    let mut app = TestApp::spawn().await;
    app.mock_csrf().await;
    app.backend
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/register/");
            then.status(400).json_body(json!({
                "name": ["Name contains invalid characters"],
                "username": ["A user with that username already exists."]
            }));
        })
        .await;

    let response = app.post_form("/auth/signup", &signup_fields("customer")).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("A user with that username already exists."));

    // Backend `name` errors render under the full name input
    let input = response.body.find("name=\"full_name\"").unwrap();
    let error = response.body.find("Name contains invalid characters").unwrap();
    let next_input = response.body.find("name=\"username\"").unwrap();
    assert!(input < error && error < next_input);
    assert!(!response.body.contains("value=\"Secret123\""));
}

#[tokio::test]
async fn test_admin_signup_shows_wrong_secret_on_secret_field() {
    let mut app = TestApp::spawn().await;
    app.mock_csrf().await;
    let create = app
        .backend
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/auth/create-superuser/")
                .json_body_partial(r#"{ "secret": "not-the-key" }"#);
            then.status(400)
                .json_body(json!({ "secret": ["Invalid secret key"] }));
        })
        .await;

    let response = app
        .post_form(
            "/auth/admin",
            &[
                ("email", "root@example.com"),
                ("username", "root"),
                ("name", "Site Admin"),
                ("password", "hunter22"),
                ("secret_key", "not-the-key"),
            ],
        )
        .await;

    create.assert_async().await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let input = response.body.find("name=\"secret_key\"").unwrap();
    let error = response.body.find("Invalid secret key").unwrap();
    assert!(input < error);
    assert!(!response.body.contains("value=\"hunter22\""));
}

#[tokio::test]
async fn test_login_without_role_flags_defaults_to_customer() {
    let mut app = TestApp::spawn().await;
    let response = app
        .sign_in_as(json!({
            "id": 7,
            "username": "asha",
            "email": "asha@example.com",
            "name": "Asha Rao",
            "phone": "9876543210",
            "address": "12 Lake Road, Pune"
        }))
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/products"));

    let response = app.get("/seller").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_without_role_flags_keeps_signup_role() {
    let mut app = TestApp::spawn().await;
    app.mock_csrf().await;
    app.backend
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/register/");
            then.status(201)
                .header("Set-Cookie", "sessionid=sess456; Path=/; HttpOnly")
                .json_body(json!({ "id": 8, "username": "ravi", "email": "ravi@example.com" }));
        })
        .await;
    app.post_form("/auth/signup", &signup_fields("seller")).await;

    let response = app
        .sign_in_as(json!({
            "id": 8,
            "username": "ravi",
            "email": "ravi@example.com",
            "name": "Ravi Kumar",
            "phone": "9123456780",
            "address": "4 Market Street, Pune"
        }))
        .await;

    assert_eq!(response.location(), Some("/seller"));
}
