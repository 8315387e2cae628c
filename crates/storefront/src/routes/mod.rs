//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Landing page
//! GET  /about, /contact, /terms   - Markdown content pages
//! GET  /health, /health/ready     - Health checks
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action
//! GET  /auth/signup               - Sign-up page
//! POST /auth/signup               - Sign-up action
//! GET  /auth/admin                - Superuser bootstrap page
//! POST /auth/admin                - Superuser bootstrap action
//! POST /auth/logout               - Logout action
//!
//! # Profile (requires auth)
//! GET  /profile/complete          - Profile completion form
//! POST /profile/complete          - Profile completion (multipart)
//!
//! # Products (requires auth)
//! GET  /products                  - Listing with search, category, infinite scroll
//! GET  /products/page             - Next listing page (HTMX fragment)
//! GET  /products/{id}             - Product detail with rental dates
//! POST /products/{id}/quote       - Rental quote (HTMX fragment)
//!
//! # Wishlist & orders (requires auth)
//! GET  /wishlist                  - Wishlist with summary
//! POST /wishlist/add              - Save a product (triggers wishlist-updated)
//! POST /wishlist/{id}/quantity    - Change quantity
//! POST /wishlist/{id}/remove      - Remove an entry
//! POST /wishlist/checkout         - Create an order, render the payment page
//! POST /orders/verify             - Payment verification callback
//!
//! # Account (requires auth)
//! GET  /account                   - Profile and rentals
//! POST /account/delete            - Delete the account
//!
//! # Seller (requires seller)
//! GET  /seller                    - Own listings and rentals
//! GET  /seller/products/new       - New listing form
//! POST /seller/products/new       - Create listing (multipart)
//! ```

pub mod account;
pub mod auth;
pub mod health;
pub mod home;
pub mod orders;
pub mod pages;
pub mod products;
pub mod profile;
pub mod seller;
pub mod uploads;
pub mod wishlist;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRequestParts, Request},
    http::request::Parts,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;

use crate::middleware::{
    CspNonce, OptionalAuth, auth_rate_limiter, csp_nonce_middleware, request_id_middleware,
    security_headers_middleware, session_layer,
};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Static assets, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Largest accepted multipart body: three 5 MiB images plus form fields.
const UPLOAD_BODY_LIMIT: usize = 16 * 1024 * 1024;

// =============================================================================
// Shared page context
// =============================================================================

/// Data every page layout needs: the signed-in user and the CSP nonce.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    pub user: Option<CurrentUser>,
    pub nonce: String,
}

impl Layout {
    #[must_use]
    pub fn is_seller(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_seller)
    }
}

impl<S> FromRequestParts<S> for Layout
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAuth(user) = OptionalAuth::from_request_parts(parts, state).await?;
        let CspNonce(nonce) = CspNonce::from_request_parts(parts, state).await?;
        Ok(Self { user, nonce })
    }
}

/// Whether a request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &axum::http::HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
///
/// Form posts share one per-IP rate limiter.
pub fn auth_routes() -> Router<AppState> {
    let limiter = auth_rate_limiter();

    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(limiter.clone())),
        )
        .route(
            "/signup",
            get(auth::signup_page).merge(post(auth::signup).layer(limiter.clone())),
        )
        .route(
            "/admin",
            get(auth::admin_page).merge(post(auth::admin_signup).layer(limiter)),
        )
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/page", get(products::page))
        .route("/{id}", get(products::show))
        .route("/{id}/quote", post(products::quote))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/{id}/quantity", post(wishlist::update_quantity))
        .route("/{id}/remove", post(wishlist::remove))
        .route("/checkout", post(orders::checkout))
}

/// Create the seller routes router.
pub fn seller_routes() -> Router<AppState> {
    Router::new().route("/", get(seller::dashboard)).route(
        "/products/new",
        get(seller::new_product)
            .post(seller::create_product)
            .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
    )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(pages::router())
        .merge(health::router())
        .nest("/auth", auth_routes())
        .route(
            "/profile/complete",
            get(profile::complete_page)
                .post(profile::complete)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .nest("/products", product_routes())
        .nest("/wishlist", wishlist_routes())
        .route("/orders/verify", post(orders::verify))
        .route("/account", get(account::index))
        .route("/account/delete", post(account::delete))
        .nest("/seller", seller_routes())
}

/// Build the complete application with its middleware stack.
///
/// Sentry layers are added by the binary around this router.
pub fn app<S>(state: AppState, store: S) -> Router
where
    S: SessionStore + Clone,
{
    let sessions = session_layer(store, state.config());

    Router::new()
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(from_fn(csp_nonce_middleware))
        .layer(sessions)
        .layer(from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
