//! Wishlist route handlers.
//!
//! Mutations answer HTMX requests with the refreshed wishlist fragment and
//! an `HX-Trigger: wishlist-updated` header; plain form posts get the full
//! page. Failures are shown inline, the wishlist is never changed locally.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use rentalhub_core::validation::parse_form_datetime;
use rentalhub_core::{ProductId, WishlistItemId, WishlistSummary, format_money};

use super::{Layout, is_htmx};
use crate::backend::{BackendError, NewWishlistItem, WishlistItem, sample};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{BackendCookies, RequireAuth};
use crate::state::AppState;

/// Event fired for the header badge after every successful mutation.
pub const WISHLIST_UPDATED: &str = "wishlist-updated";

/// Highest quantity accepted for one entry.
const MAX_QUANTITY: u32 = 99;

// =============================================================================
// View Types
// =============================================================================

/// One wishlist entry as rendered.
#[derive(Debug, Clone)]
pub struct WishlistRow {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub unit_price: Option<String>,
    pub line_total: Option<String>,
    pub period: Option<String>,
}

impl WishlistRow {
    fn from_item(item: &WishlistItem) -> Self {
        let line = item.line();
        let product = item.product.product();
        Self {
            id: item.id,
            product_id: item.product_id(),
            name: item.name(),
            image: product.and_then(|p| p.primary_image().map(str::to_owned)),
            quantity: line.quantity,
            unit_price: product.map(crate::backend::Product::price_label),
            line_total: line
                .unit_price
                .map(|price| format_money(price * rust_decimal::Decimal::from(line.quantity))),
            period: period_label(item.start_date, item.end_date),
        }
    }
}

fn period_label(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<String> {
    let fmt = |d: DateTime<Utc>| d.format("%b %-d, %Y").to_string();
    match (start, end) {
        (Some(start), Some(end)) => Some(format!("{} to {}", fmt(start), fmt(end))),
        (Some(start), None) => Some(format!("From {}", fmt(start))),
        _ => None,
    }
}

/// Everything inside the wishlist container.
#[derive(Debug, Clone, Default)]
pub struct WishlistContent {
    pub rows: Vec<WishlistRow>,
    pub summary: WishlistSummary,
    pub search: String,
    pub error: Option<String>,
    /// The wishlist could not be loaded at all.
    pub unavailable: bool,
}

impl WishlistContent {
    /// Build the view, filtering rows by `search` (case-insensitive name
    /// match). The summary always covers the whole wishlist.
    #[must_use]
    pub fn new(items: &[WishlistItem], search: &str) -> Self {
        let lines: Vec<_> = items.iter().map(WishlistItem::line).collect();
        let needle = search.trim().to_lowercase();
        let rows = items
            .iter()
            .filter(|item| needle.is_empty() || item.name().to_lowercase().contains(&needle))
            .map(WishlistRow::from_item)
            .collect();

        Self {
            rows,
            summary: WishlistSummary::from_lines(&lines),
            search: search.trim().to_string(),
            error: None,
            unavailable: false,
        }
    }

    #[must_use]
    pub fn has_priced_items(&self) -> bool {
        self.rows.iter().any(|row| row.line_total.is_some())
    }
}

// =============================================================================
// Form Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
}

/// Add-to-wishlist form from the product page.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub product_id: i64,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub quantity: u32,
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoveForm {
    #[serde(default)]
    pub search: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/index.html")]
pub struct WishlistTemplate {
    pub layout: Layout,
    pub content: WishlistContent,
}

/// Wishlist container fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/_content.html")]
pub struct WishlistContentTemplate {
    pub content: WishlistContent,
}

/// Confirmation shown on the product page after adding (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/_added.html")]
pub struct AddedTemplate {
    pub message: String,
    pub ok: bool,
}

// =============================================================================
// Helpers
// =============================================================================

/// Load the wishlist; failures other than an expired session become an
/// inline message.
pub(super) async fn load_content(
    state: &AppState,
    cookies: &mut BackendCookies,
    search: &str,
) -> Result<WishlistContent, AppError> {
    let result = state.backend().wishlist(cookies).await;
    cookies.save().await?;

    match result {
        Ok(items) => Ok(WishlistContent::new(&items, search)),
        Err(e) if e.is_auth() => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Wishlist load failed");
            Ok(WishlistContent {
                search: search.trim().to_string(),
                error: Some("Couldn't load your wishlist. Please try again.".to_string()),
                unavailable: true,
                ..WishlistContent::default()
            })
        }
    }
}

fn mutation_error(error: &BackendError) -> String {
    match error {
        BackendError::Validation(errors) => errors
            .general()
            .map(str::to_owned)
            .unwrap_or_else(|| errors.to_string()),
        BackendError::NotFound(_) => "That item is no longer in your wishlist.".to_string(),
        BackendError::RateLimited(secs) => {
            format!("Too many requests. Try again in {secs} seconds.")
        }
        _ => "Couldn't update your wishlist. Please try again.".to_string(),
    }
}

fn updated_header() -> [(HeaderName, HeaderValue); 1] {
    [(
        HeaderName::from_static("hx-trigger"),
        HeaderValue::from_static(WISHLIST_UPDATED),
    )]
}

/// Render the wishlist after a mutation.
async fn after_mutation(
    state: &AppState,
    cookies: &mut BackendCookies,
    layout: Layout,
    headers: &HeaderMap,
    search: &str,
    outcome: Result<(), BackendError>,
) -> Result<Response, AppError> {
    let error = match outcome {
        Ok(()) => None,
        Err(e) if e.is_auth() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Wishlist update failed");
            Some(mutation_error(&e))
        }
    };

    let mut content = load_content(state, cookies, search).await?;
    if error.is_some() {
        content.error = error.clone();
    }

    let body = if is_htmx(headers) {
        WishlistContentTemplate { content }.into_response()
    } else {
        WishlistTemplate { layout, content }.into_response()
    };

    Ok(if error.is_none() {
        (updated_header(), body).into_response()
    } else {
        body
    })
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the wishlist.
///
/// # Errors
///
/// Returns an error if the backend session has expired.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    layout: Layout,
    headers: HeaderMap,
    mut cookies: BackendCookies,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let content = load_content(&state, &mut cookies, &query.search).await?;
    if is_htmx(&headers) {
        return Ok(WishlistContentTemplate { content }.into_response());
    }
    Ok(WishlistTemplate { layout, content }.into_response())
}

/// Save a product to the wishlist.
///
/// # Errors
///
/// Returns an error if the backend session has expired.
#[instrument(skip_all, fields(user_id = %user.id, product_id = form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    mut cookies: BackendCookies,
    Form(form): Form<AddForm>,
) -> Result<Response, AppError> {
    let product = ProductId::new(form.product_id);
    if sample::is_sample(product) {
        return Ok(added(
            &headers,
            false,
            "Sample products can't be saved. Try again when the catalog is back.",
        ));
    }

    let item = NewWishlistItem {
        product,
        quantity: form.quantity.unwrap_or(1).clamp(1, MAX_QUANTITY),
        start_date: parse_form_datetime(&form.start_date),
        end_date: parse_form_datetime(&form.end_date),
    };
    let result = state.backend().add_to_wishlist(&mut cookies, &item).await;
    cookies.save().await?;

    match result {
        Ok(_) => {
            tracing::info!("Added to wishlist");
            let response = added(&headers, true, "Saved to your wishlist");
            Ok((updated_header(), response).into_response())
        }
        Err(e) if e.is_auth() => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Add to wishlist failed");
            Ok(added(&headers, false, &mutation_error(&e)))
        }
    }
}

fn added(headers: &HeaderMap, ok: bool, message: &str) -> Response {
    if is_htmx(headers) {
        AddedTemplate {
            message: message.to_string(),
            ok,
        }
        .into_response()
    } else {
        Redirect::to("/wishlist").into_response()
    }
}

/// Change the quantity of an entry.
///
/// # Errors
///
/// Returns an error if the backend session has expired.
#[instrument(skip_all, fields(user_id = %user.id, item_id = id))]
pub async fn update_quantity(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    layout: Layout,
    headers: HeaderMap,
    mut cookies: BackendCookies,
    Path(id): Path<i64>,
    Form(form): Form<QuantityForm>,
) -> Result<Response, AppError> {
    let quantity = form.quantity.clamp(1, MAX_QUANTITY);
    let outcome = state
        .backend()
        .update_wishlist_quantity(&mut cookies, WishlistItemId::new(id), quantity)
        .await;
    after_mutation(&state, &mut cookies, layout, &headers, &form.search, outcome).await
}

/// Remove an entry.
///
/// # Errors
///
/// Returns an error if the backend session has expired.
#[instrument(skip_all, fields(user_id = %user.id, item_id = id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    layout: Layout,
    headers: HeaderMap,
    mut cookies: BackendCookies,
    Path(id): Path<i64>,
    Form(form): Form<RemoveForm>,
) -> Result<Response, AppError> {
    let outcome = state
        .backend()
        .remove_from_wishlist(&mut cookies, WishlistItemId::new(id))
        .await;
    after_mutation(&state, &mut cookies, layout, &headers, &form.search, outcome).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;
    use crate::backend::{Product, ProductRef};

    fn item(id: i64, title: &str, per_day: Option<i64>, quantity: u32) -> WishlistItem {
        WishlistItem {
            id: WishlistItemId::new(id),
            product: ProductRef::Full(Box::new(Product {
                id: ProductId::new(id * 10),
                title: title.to_string(),
                price_per_day: per_day.map(Decimal::from),
                ..Product::default()
            })),
            quantity,
            ..WishlistItem::default()
        }
    }

    #[test]
    fn test_content_filters_rows_but_not_summary() {
        let items = vec![
            item(1, "Canon EOS R6", Some(45), 2),
            item(2, "Power Drill", Some(10), 1),
            item(3, "Mystery box", None, 1),
        ];
        let content = WishlistContent::new(&items, " canon ");

        assert_eq!(content.rows.len(), 1);
        assert_eq!(content.rows[0].name, "Canon EOS R6");
        assert_eq!(content.rows[0].line_total.as_deref(), Some("$90.00"));
        assert_eq!(content.search, "canon");

        assert_eq!(content.summary.items, 3);
        assert_eq!(content.summary.total_quantity, 4);
        assert_eq!(content.summary.total_value, Decimal::from(100));
        assert!(content.has_priced_items());
    }

    #[test]
    fn test_unpriced_rows_have_no_total() {
        let content = WishlistContent::new(&[item(3, "Mystery box", None, 1)], "");
        assert!(content.rows[0].line_total.is_none());
        assert!(!content.has_priced_items());
    }

    #[test]
    fn test_period_label() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap();
        assert_eq!(
            period_label(Some(start), Some(end)).unwrap(),
            "Mar 1, 2025 to Mar 4, 2025"
        );
        assert!(period_label(None, Some(end)).is_none());
    }

    #[test]
    fn test_mutation_error_messages() {
        let err = BackendError::NotFound("gone".to_string());
        assert_eq!(mutation_error(&err), "That item is no longer in your wishlist.");

        let err = BackendError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(mutation_error(&err).starts_with("Couldn't update"));
    }
}
