//! Backend REST client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP. Caches public product data using `moka`
//! (60-second TTL).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{ACCEPT, COOKIE, REFERER, RETRY_AFTER};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use rentalhub_core::pagination::MAX_LIMIT;
use rentalhub_core::validation::ProductDraft;
use rentalhub_core::{FieldErrors, Page, PageRequest, ProductId, WishlistItemId};

use super::cache::{CacheKey, CacheValue};
use super::session::BackendSession;
use super::types::{
    Ack, NewOrder, NewWishlistItem, OrderCreated, PaymentVerification, Product, ProductListing,
    ProductRef, Registration, SuperuserRequest, Transaction, TransactionListing, User, WishlistItem,
    WishlistListing,
};
use super::BackendError;
use crate::config::BackendConfig;

const CACHE_TTL: Duration = Duration::from_secs(60);
const CACHE_CAPACITY: u64 = 500;

/// Upper bound on listing pages read when collecting one owner's listings.
pub const MAX_OWNER_SCAN_PAGES: u32 = 50;

/// Header Django reads the CSRF token from.
const CSRF_HEADER: &str = "X-CSRFToken";

/// Detail the backend sends when a request carries no valid session.
const NOT_AUTHENTICATED: &str = "credentials were not provided";

/// Maximum number of response body characters written to logs.
const LOG_BODY_CHARS: usize = 500;

/// An uploaded file forwarded to the backend.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    fn into_part(self) -> Result<Part, BackendError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)?)
    }
}

/// Profile completion as sent to `POST /api/auth/profile/complete/`.
#[derive(Debug, Clone)]
pub struct ProfileSubmission {
    pub phone: String,
    pub address: String,
    pub is_customer: bool,
    pub business_name: Option<String>,
    pub gst_number: Option<String>,
    pub profile_pic: Option<FileUpload>,
}

/// A new listing as sent to `POST /api/rentals/products/`.
#[derive(Debug, Clone)]
pub struct ProductSubmission {
    pub draft: ProductDraft,
    /// Up to three images; the first becomes `main_image`.
    pub images: Vec<FileUpload>,
}

/// Request body variants.
enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the rental backend REST API.
///
/// Cheap to clone; all clones share one connection pool and cache. Per-user
/// state lives in the [`BackendSession`] passed to each call.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    referer: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("RentalHub-Storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                referer: config.api_url.as_str().to_owned(),
                base_url: config.api_url.clone(),
                cache,
            }),
        })
    }

    /// The backend origin.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Send a request and return the body of a successful response.
    async fn send(
        &self,
        session: &mut BackendSession,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Body,
    ) -> Result<String, BackendError> {
        if is_mutating(&method) && session.csrf_token().is_none() {
            self.ensure_csrf(session).await?;
        }
        self.dispatch(session, method, path, query, body).await
    }

    /// Issue one request as-is, without bootstrapping a CSRF token.
    async fn dispatch(
        &self,
        session: &mut BackendSession,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Body,
    ) -> Result<String, BackendError> {
        let mutating = is_mutating(&method);
        let mut url = self.inner.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let mut request = self
            .inner
            .client
            .request(method.clone(), url)
            .header(ACCEPT, "application/json");

        if let Some(cookies) = session.cookie_header() {
            request = request.header(COOKIE, cookies);
        }
        if mutating {
            request = request.header(REFERER, &self.inner.referer);
            if let Some(token) = session.csrf_token() {
                request = request.header(CSRF_HEADER, token);
            }
        }
        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(&value),
            Body::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await?;
        session.absorb(response.headers());

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let text = response.text().await?;
        if status.is_success() {
            return Ok(text);
        }

        if status.is_server_error() {
            tracing::error!(
                %method,
                path,
                status = %status,
                body = %truncate(&text),
                "Backend returned server error"
            );
        } else {
            debug!(%method, path, status = %status, "Backend rejected request");
        }
        Err(error_from_status(status, &text))
    }

    /// Send a JSON request and decode the JSON response.
    async fn call<T: DeserializeOwned>(
        &self,
        session: &mut BackendSession,
        method: Method,
        path: &str,
        body: Body,
    ) -> Result<T, BackendError> {
        let text = self.send(session, method, path, &[], body).await?;
        decode(&text)
    }

    /// Make sure the session holds a CSRF token, fetching one if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the bootstrap request fails or sets no token.
    #[instrument(skip_all)]
    pub async fn ensure_csrf(&self, session: &mut BackendSession) -> Result<(), BackendError> {
        if session.csrf_token().is_some() {
            return Ok(());
        }
        debug!("Fetching CSRF token");
        self.dispatch(session, Method::GET, "api/auth/csrf", &[], Body::Empty)
            .await?;
        if session.csrf_token().is_none() {
            return Err(BackendError::MissingCsrfToken);
        }
        Ok(())
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Sign in with username and password.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad credentials, or an error if the request fails.
    #[instrument(skip(self, session, password))]
    pub async fn login(
        &self,
        session: &mut BackendSession,
        username: &str,
        password: &str,
    ) -> Result<User, BackendError> {
        let body = serde_json::json!({ "username": username, "password": password });
        self.call(session, Method::POST, "api/auth/login/", Body::Json(body))
            .await
    }

    /// Register a new account. The backend signs the new user in.
    ///
    /// # Errors
    ///
    /// Returns `Validation` with field errors, or an error if the request fails.
    #[instrument(skip(self, session, registration), fields(username = %registration.username))]
    pub async fn register(
        &self,
        session: &mut BackendSession,
        registration: &Registration<'_>,
    ) -> Result<User, BackendError> {
        self.call(
            session,
            Method::POST,
            "api/auth/register/",
            Body::Json(to_json(registration)?),
        )
        .await
    }

    /// Create a superuser, authorized by the shared secret.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for a wrong secret, `Validation` for missing or
    /// taken fields, or an error if the request fails.
    #[instrument(skip(self, session, request), fields(username = %request.username))]
    pub async fn create_superuser(
        &self,
        session: &mut BackendSession,
        request: &SuperuserRequest<'_>,
    ) -> Result<Ack, BackendError> {
        self.call(
            session,
            Method::POST,
            "api/auth/create-superuser/",
            Body::Json(to_json(request)?),
        )
        .await
    }

    /// End the backend session.
    ///
    /// The local copy of the session cookie is dropped even if the call fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn logout(&self, session: &mut BackendSession) -> Result<(), BackendError> {
        let result = self
            .send(session, Method::POST, "api/auth/logout/", &[], Body::Empty)
            .await
            .map(|_| ());
        session.end_session();
        result
    }

    /// The user the backend session belongs to.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized`/`Forbidden` without a valid session.
    #[instrument(skip_all)]
    pub async fn whoami(&self, session: &mut BackendSession) -> Result<User, BackendError> {
        self.call(session, Method::GET, "api/auth/whoami/", Body::Empty)
            .await
    }

    /// Submit the post-registration profile.
    ///
    /// # Errors
    ///
    /// Returns `Validation` with field errors, or an error if the request fails.
    #[instrument(skip_all, fields(is_customer = profile.is_customer))]
    pub async fn complete_profile(
        &self,
        session: &mut BackendSession,
        profile: ProfileSubmission,
    ) -> Result<User, BackendError> {
        let mut form = Form::new()
            .text("phone", profile.phone)
            .text("address", profile.address)
            .text("is_customer", profile.is_customer.to_string());
        if let Some(name) = profile.business_name {
            form = form.text("business_name", name);
        }
        if let Some(gst) = profile.gst_number {
            form = form.text("gst_number", gst);
        }
        if let Some(picture) = profile.profile_pic {
            form = form.part("profile_pic", picture.into_part()?);
        }

        self.call(
            session,
            Method::POST,
            "api/auth/profile/complete/",
            Body::Multipart(form),
        )
        .await
    }

    /// Delete the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn delete_account(&self, session: &mut BackendSession) -> Result<(), BackendError> {
        self.send(session, Method::DELETE, "api/auth/me/delete/", &[], Body::Empty)
            .await?;
        session.end_session();
        Ok(())
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get one page of products.
    ///
    /// `shared_view` marks callers that see the same listing as every other
    /// customer (sellers also see their own pending listings); only those
    /// pages are cached, and only without a search term.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(
        skip(self, session, request),
        fields(page = request.page(), search = ?request.search(), category = ?request.category())
    )]
    pub async fn products(
        &self,
        session: &mut BackendSession,
        request: &PageRequest,
        shared_view: bool,
    ) -> Result<Page<Product>, BackendError> {
        let cache_key = shared_view.then(|| CacheKey::for_listing(request)).flatten();

        if let Some(key) = &cache_key
            && let Some(CacheValue::Products(page)) = self.inner.cache.get(key).await
        {
            debug!("Cache hit for product listing");
            return Ok(page);
        }

        let text = self
            .send(
                session,
                Method::GET,
                "api/rentals/products/",
                &request.query_pairs(),
                Body::Empty,
            )
            .await?;
        let listing: ProductListing = decode(&text)?;
        let (items, total) = listing.into_parts();
        let page = Page::new(items, total, request);

        if let Some(key) = cache_key {
            self.inner
                .cache
                .insert(key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Every listing owned by `owner`, walking the listing page by page.
    ///
    /// The listing endpoint has no owner filter, so all pages are read
    /// (at most [`MAX_OWNER_SCAN_PAGES`] of them).
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    #[instrument(skip(self, session))]
    pub async fn products_owned_by(
        &self,
        session: &mut BackendSession,
        owner: &str,
    ) -> Result<Vec<Product>, BackendError> {
        let mut request = PageRequest::new(1, MAX_LIMIT);
        let mut owned = Vec::new();

        for _ in 0..MAX_OWNER_SCAN_PAGES {
            let page = self.products(session, &request, false).await?;
            let next = page.next_page();
            owned.extend(page.items.into_iter().filter(|p| p.owner == owner));
            match next {
                Some(next) => request = request.with_page(next),
                None => return Ok(owned),
            }
        }

        tracing::warn!(owner, "Stopped scanning listings after page limit");
        Ok(owned)
    }

    /// Get a product by id.
    ///
    /// Tries the detail route first; backends that only expose the listing
    /// are searched through their first page of up to 100 products.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no visible product has this id.
    #[instrument(skip(self, session), fields(product_id = %id))]
    pub async fn product(
        &self,
        session: &mut BackendSession,
        id: ProductId,
    ) -> Result<Product, BackendError> {
        let cache_key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("api/rentals/products/{id}/");
        let product = match self.call::<Product>(session, Method::GET, &path, Body::Empty).await {
            Ok(product) => product,
            Err(BackendError::NotFound(_) | BackendError::Status { status: 405, .. }) => {
                let request = PageRequest::new(1, MAX_LIMIT);
                self.products(session, &request, false)
                    .await?
                    .items
                    .into_iter()
                    .find(|p| p.id == id)
                    .ok_or_else(|| BackendError::NotFound(format!("Product not found: {id}")))?
            }
            Err(e) => return Err(e),
        };

        if product.is_approved && !product.is_rejected && product.is_active {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }

        Ok(product)
    }

    /// Create a listing. Sellers only.
    ///
    /// # Errors
    ///
    /// Returns `Validation` with field errors, `Forbidden` for non-sellers,
    /// or an error if the request fails.
    #[instrument(skip_all, fields(title = %submission.draft.title))]
    pub async fn create_product(
        &self,
        session: &mut BackendSession,
        submission: ProductSubmission,
    ) -> Result<Product, BackendError> {
        let form = product_form(submission)?;
        let product: Product = self
            .call(session, Method::POST, "api/rentals/products/", Body::Multipart(form))
            .await?;

        self.invalidate_products().await;
        Ok(product)
    }

    /// Drop all cached product data.
    pub async fn invalidate_products(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    // =========================================================================
    // Wishlist Methods
    // =========================================================================

    /// Get the user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn wishlist(
        &self,
        session: &mut BackendSession,
    ) -> Result<Vec<WishlistItem>, BackendError> {
        let listing: WishlistListing = self
            .call(session, Method::GET, "api/wishlist/", Body::Empty)
            .await?;
        let mut items = listing.into_items();

        // Entries that only carry a product id get the product attached so
        // they can be priced.
        for item in &mut items {
            if let ProductRef::Id(id) = item.product {
                match self.product(session, id).await {
                    Ok(product) => item.product = ProductRef::Full(Box::new(product)),
                    Err(e) if e.is_auth() => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, product_id = %id, "Wishlist product not found");
                    }
                }
            }
        }

        Ok(items)
    }

    /// Save a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, session, item), fields(product_id = %item.product))]
    pub async fn add_to_wishlist(
        &self,
        session: &mut BackendSession,
        item: &NewWishlistItem,
    ) -> Result<WishlistItem, BackendError> {
        self.call(session, Method::POST, "api/wishlist/", Body::Json(to_json(item)?))
            .await
    }

    /// Change the quantity of a wishlist entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn update_wishlist_quantity(
        &self,
        session: &mut BackendSession,
        id: WishlistItemId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let path = format!("api/wishlist/{id}/");
        let body = serde_json::json!({ "quantity": quantity });
        self.send(session, Method::PATCH, &path, &[], Body::Json(body))
            .await?;
        Ok(())
    }

    /// Remove a wishlist entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn remove_from_wishlist(
        &self,
        session: &mut BackendSession,
        id: WishlistItemId,
    ) -> Result<(), BackendError> {
        let path = format!("api/wishlist/{id}/");
        self.send(session, Method::DELETE, &path, &[], Body::Empty)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Order & Transaction Methods
    // =========================================================================

    /// Create a payment order for the given lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, session, order), fields(lines = order.items.len(), total = %order.total_amount))]
    pub async fn create_order(
        &self,
        session: &mut BackendSession,
        order: &NewOrder,
    ) -> Result<OrderCreated, BackendError> {
        self.call(session, Method::POST, "api/orders/create/", Body::Json(to_json(order)?))
            .await
    }

    /// Confirm a completed payment.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the signature is rejected, or an error if the
    /// request fails.
    #[instrument(skip(self, session, verification), fields(order_id = %verification.razorpay_order_id))]
    pub async fn verify_payment(
        &self,
        session: &mut BackendSession,
        verification: &PaymentVerification,
    ) -> Result<Ack, BackendError> {
        let text = self
            .send(
                session,
                Method::POST,
                "api/orders/verify/",
                &[],
                Body::Json(to_json(verification)?),
            )
            .await?;
        if text.trim().is_empty() {
            return Ok(Ack::default());
        }
        decode(&text)
    }

    /// Rentals where the user is the renter.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn customer_transactions(
        &self,
        session: &mut BackendSession,
    ) -> Result<Vec<Transaction>, BackendError> {
        let listing: TransactionListing = self
            .call(session, Method::GET, "api/customer/transactions/", Body::Empty)
            .await?;
        Ok(listing.into_items())
    }

    /// Rentals of the user's own products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn seller_transactions(
        &self,
        session: &mut BackendSession,
    ) -> Result<Vec<Transaction>, BackendError> {
        let listing: TransactionListing = self
            .call(session, Method::GET, "api/seller/transactions/", Body::Empty)
            .await?;
        Ok(listing.into_items())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Build the multipart body of a new listing.
fn product_form(submission: ProductSubmission) -> Result<Form, BackendError> {
    let ProductSubmission { draft, images } = submission;
    let rates = draft.rates();

    let mut form = Form::new()
        .text("title", draft.title.trim().to_owned())
        .text("description", draft.description.trim().to_owned())
        .text("pickup_address", draft.pickup_address.trim().to_owned())
        .text("price_unit", draft.price_unit.as_str());

    for (unit, price) in rates.listed() {
        form = form.text(ProductDraft::price_field(unit), price.to_string());
    }
    if let Some(pickup) = draft.pickup_at() {
        form = form.text("pickup_date", pickup.to_rfc3339());
    }
    if let Some(expiry) = draft.expires_at() {
        form = form.text("expiration_date", expiry.to_rfc3339());
    }

    for (field, image) in ["main_image", "image_2", "image_3"].into_iter().zip(images) {
        form = form.part(field, image.into_part()?);
    }

    Ok(form)
}

fn is_mutating(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, BackendError> {
    Ok(serde_json::to_value(value)?)
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, BackendError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %truncate(text),
            "Failed to parse backend response"
        );
        BackendError::Parse(e)
    })
}

fn truncate(text: &str) -> String {
    text.chars().take(LOG_BODY_CHARS).collect()
}

/// Map a non-success response onto a [`BackendError`].
fn error_from_status(status: StatusCode, text: &str) -> BackendError {
    let body = if text.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(truncate(text)))
    };
    let errors = FieldErrors::from_backend(&body);
    let message = errors
        .general()
        .or_else(|| errors.iter().find_map(|(_, msgs)| msgs.first().map(String::as_str)))
        .map_or_else(
            || status.canonical_reason().unwrap_or("Request failed").to_owned(),
            str::to_owned,
        );

    match status {
        StatusCode::BAD_REQUEST => {
            if errors.is_empty() {
                BackendError::Validation(FieldErrors::non_field(message))
            } else {
                BackendError::Validation(errors)
            }
        }
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized(message),
        // Session authentication answers a missing login with 403
        StatusCode::FORBIDDEN if message.contains(NOT_AUTHENTICATED) => {
            BackendError::Unauthorized(message)
        }
        StatusCode::FORBIDDEN => BackendError::Forbidden(message),
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        _ => BackendError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_status_field_errors() {
        let err = error_from_status(
            StatusCode::BAD_REQUEST,
            r#"{"email": ["Email already in use"]}"#,
        );
        match err {
            BackendError::Validation(errors) => {
                assert_eq!(errors.first("email"), Some("Email already in use"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_from_status_detail() {
        let err = error_from_status(StatusCode::BAD_REQUEST, r#"{"detail": "Invalid credentials"}"#);
        match err {
            BackendError::Validation(errors) => {
                assert_eq!(errors.general(), Some("Invalid credentials"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_from_status_forbidden_and_html() {
        let err = error_from_status(StatusCode::FORBIDDEN, r#"{"error": "Unauthorized"}"#);
        assert!(matches!(err, BackendError::Forbidden(ref m) if m == "Unauthorized"));

        let err = error_from_status(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert!(matches!(err, BackendError::Status { status: 502, .. }));

        let err = error_from_status(
            StatusCode::FORBIDDEN,
            r#"{"detail": "Authentication credentials were not provided."}"#,
        );
        assert!(err.is_auth());

        let err = error_from_status(StatusCode::NOT_FOUND, "");
        assert!(matches!(err, BackendError::NotFound(ref m) if m == "Not Found"));
    }

    #[test]
    fn test_truncate() {
        let long = "x".repeat(LOG_BODY_CHARS + 10);
        assert_eq!(truncate(&long).len(), LOG_BODY_CHARS);
    }
}
