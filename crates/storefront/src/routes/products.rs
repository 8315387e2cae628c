//! Product listing and detail route handlers.
//!
//! The listing page renders the first page; further pages and searches are
//! HTMX fragments from `/products/page`. A sentinel at the end of each page
//! loads the next one when it scrolls into view.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use rentalhub_core::validation::parse_form_datetime;
use rentalhub_core::{ListingStatus, PageRequest, ProductId, RentalUnit, format_money};

use super::Layout;
use crate::backend::{BackendError, Product, sample};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{BackendCookies, RequireAuth};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Category filter options as `(value, label)`.
pub const CATEGORIES: &[(&str, &str)] = &[
    ("electronics", "Electronics"),
    ("tools", "Tools"),
    ("audio", "Audio Equipment"),
    ("furniture", "Furniture"),
    ("events", "Events"),
];

/// A category `<option>`.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

pub(super) fn category_options(selected: Option<&str>) -> Vec<CategoryOption> {
    CATEGORIES
        .iter()
        .map(|&(value, label)| CategoryOption {
            value,
            label,
            selected: selected.is_some_and(|s| s.eq_ignore_ascii_case(value)),
        })
        .collect()
}

// =============================================================================
// View Types
// =============================================================================

/// A product as shown on a listing card.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub image: Option<String>,
    pub owner: String,
    pub status: ListingStatus,
    pub rejection_reason: Option<String>,
}

impl ProductCard {
    #[must_use]
    pub fn from_product(product: &Product, now: DateTime<Utc>) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category_label().to_string(),
            price: product.price_label(),
            image: product.primary_image().map(str::to_owned),
            owner: product.owner.clone(),
            status: product.status(now),
            rejection_reason: product.rejection_reason.clone(),
        }
    }

    #[must_use]
    pub const fn is_sample(&self) -> bool {
        sample::is_sample(self.id)
    }
}

/// One page of listing cards plus what comes after it.
#[derive(Debug, Clone, Default)]
pub struct ListingChunk {
    pub cards: Vec<ProductCard>,
    /// Fragment URL of the following page.
    pub next_url: Option<String>,
    /// Fragment URL that reloads this page.
    pub retry_url: String,
    /// Cards are sample products because the backend failed.
    pub sample: bool,
    /// The backend failed on a later page.
    pub error: Option<String>,
    pub first_page: bool,
}

// =============================================================================
// Query Types
// =============================================================================

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
}

impl ListingQuery {
    fn to_request(&self, page_size: u32) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), page_size)
            .with_search(self.search.as_deref())
            .with_category(self.category.as_deref())
    }
}

/// Rental period picked on the detail page.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteForm {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub quantity: Option<u32>,
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub search: String,
    pub categories: Vec<CategoryOption>,
    pub chunk: ListingChunk,
}

/// Listing fragment template (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "products/_chunk.html")]
pub struct ListingChunkTemplate {
    pub chunk: ListingChunk,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: Product,
    pub images: Vec<String>,
    pub rates: Vec<(RentalUnit, String)>,
    pub status: ListingStatus,
    pub price: String,
    pub is_sample: bool,
    pub can_rent: bool,
}

impl ProductShowTemplate {
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.status == ListingStatus::Live
    }
}

/// Rental quote fragment template (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "products/_quote.html")]
pub struct QuoteTemplate {
    pub total: Option<String>,
    pub message: Option<String>,
    pub quantity: u32,
}

// =============================================================================
// Helpers
// =============================================================================

fn page_url(request: &PageRequest) -> String {
    let query: Vec<String> = request
        .query_pairs()
        .into_iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
        .collect();
    format!("/products/page?{}", query.join("&"))
}

/// Fetch one listing page, degrading to sample products or an error row
/// when the backend fails.
///
/// Sellers see their own unapproved listings in the backend response, so
/// only customer listings are shared through the cache.
async fn load_chunk(
    state: &AppState,
    cookies: &mut BackendCookies,
    user: &CurrentUser,
    request: &PageRequest,
) -> Result<ListingChunk, AppError> {
    let now = Utc::now();
    let result = state
        .backend()
        .products(cookies, request, !user.is_seller())
        .await;
    cookies.save().await?;

    let mut chunk = ListingChunk {
        retry_url: page_url(request),
        first_page: request.page() == 1,
        ..ListingChunk::default()
    };

    match result {
        Ok(page) => {
            chunk.next_url = page
                .next_page()
                .map(|next| page_url(&request.clone().with_page(next)));
            chunk.cards = page
                .items
                .iter()
                .map(|p| ProductCard::from_product(p, now))
                .collect();
        }
        Err(e) if e.is_auth() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, page = request.page(), "Product listing failed");
            if chunk.first_page && state.config().backend.sample_fallback {
                chunk.sample = true;
                chunk.cards = sample::filtered(request.search(), request.category())
                    .iter()
                    .map(|p| ProductCard::from_product(p, now))
                    .collect();
            } else {
                chunk.error = Some(listing_error(&e));
            }
        }
    }

    Ok(chunk)
}

fn listing_error(error: &BackendError) -> String {
    match error {
        BackendError::RateLimited(secs) => {
            format!("Too many requests. Try again in {secs} seconds.")
        }
        _ => "Couldn't load more products.".to_string(),
    }
}

/// Load a product by id; negative ids are sample products.
///
/// # Errors
///
/// Returns `NotFound` for unknown ids, or the backend error.
pub(super) async fn load_product(
    state: &AppState,
    cookies: &mut BackendCookies,
    id: ProductId,
) -> Result<Product, AppError> {
    if sample::is_sample(id) {
        return sample::find(id).ok_or_else(|| AppError::NotFound(format!("product {id}")));
    }

    let result = state.backend().product(cookies, id).await;
    cookies.save().await?;
    Ok(result?)
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the product listing.
///
/// # Errors
///
/// Returns an error if the backend session has expired or the session
/// store fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    layout: Layout,
    mut cookies: BackendCookies,
    Query(query): Query<ListingQuery>,
) -> Result<ProductsIndexTemplate, AppError> {
    let request = ListingQuery {
        page: Some(1),
        ..query
    }
    .to_request(state.config().backend.page_size);
    let chunk = load_chunk(&state, &mut cookies, &user, &request).await?;

    Ok(ProductsIndexTemplate {
        layout,
        search: request.search().unwrap_or_default().to_string(),
        categories: category_options(request.category()),
        chunk,
    })
}

/// Render one listing page as an HTMX fragment.
///
/// # Errors
///
/// Returns an error if the backend session has expired or the session
/// store fails.
#[instrument(skip_all, fields(user_id = %user.id, page = query.page))]
pub async fn page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut cookies: BackendCookies,
    Query(query): Query<ListingQuery>,
) -> Result<ListingChunkTemplate, AppError> {
    let request = query.to_request(state.config().backend.page_size);
    let chunk = load_chunk(&state, &mut cookies, &user, &request).await?;
    Ok(ListingChunkTemplate { chunk })
}

/// Display a product with rental date selection.
///
/// # Errors
///
/// Returns 404 if the product doesn't exist.
#[instrument(skip_all, fields(product_id = id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    layout: Layout,
    mut cookies: BackendCookies,
    Path(id): Path<i64>,
) -> Result<ProductShowTemplate, AppError> {
    let product = load_product(&state, &mut cookies, ProductId::new(id)).await?;
    let is_sample = sample::is_sample(product.id);
    let status = product.status(Utc::now());

    Ok(ProductShowTemplate {
        layout,
        images: product.images().into_iter().map(str::to_owned).collect(),
        rates: product
            .rates()
            .listed()
            .into_iter()
            .map(|(unit, price)| (unit, format_money(price)))
            .collect(),
        price: product.price_label(),
        can_rent: !is_sample && !user.is_seller() && status == ListingStatus::Live,
        is_sample,
        status,
        product,
    })
}

/// Quote a rental period (HTMX fragment).
///
/// # Errors
///
/// Returns 404 if the product doesn't exist.
#[instrument(skip_all, fields(product_id = id))]
pub async fn quote(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    mut cookies: BackendCookies,
    Path(id): Path<i64>,
    Form(form): Form<QuoteForm>,
) -> Result<QuoteTemplate, AppError> {
    let product = load_product(&state, &mut cookies, ProductId::new(id)).await?;
    Ok(build_quote(&product, &form))
}

fn build_quote(product: &Product, form: &QuoteForm) -> QuoteTemplate {
    let quantity = form.quantity.unwrap_or(1);
    let dates = parse_form_datetime(&form.start_date).zip(parse_form_datetime(&form.end_date));

    let Some((start, end)) = dates else {
        return QuoteTemplate {
            total: None,
            message: Some("Choose a start and end date".to_string()),
            quantity,
        };
    };

    match product.quote(start, end, quantity) {
        Ok(total) => QuoteTemplate {
            total: Some(format_money(total)),
            message: None,
            quantity,
        },
        Err(e) => QuoteTemplate {
            total: None,
            message: Some(capitalize(&e.to_string())),
            quantity,
        },
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_listing_query_drops_all_category() {
        let query = ListingQuery {
            page: Some(3),
            search: Some("  drill ".to_string()),
            category: Some("all".to_string()),
        };
        let request = query.to_request(12);
        assert_eq!(request.page(), 3);
        assert_eq!(request.search(), Some("drill"));
        assert_eq!(request.category(), None);
    }

    #[test]
    fn test_category_options_mark_selection() {
        let options = category_options(Some("Audio"));
        assert_eq!(options.len(), CATEGORIES.len());
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].value, "audio");
        assert!(category_options(None).iter().all(|o| !o.selected));
    }

    #[test]
    fn test_page_url_encodes_filters() {
        let request = PageRequest::new(2, 12)
            .with_search(Some("sound & light"))
            .with_category(Some("audio"));
        assert_eq!(
            page_url(&request),
            "/products/page?page=2&limit=12&search=sound%20%26%20light&category=audio"
        );
    }

    #[test]
    fn test_quote_rounds_partial_days() {
        let product = Product {
            price_per_day: Some(Decimal::from(100)),
            price_unit: RentalUnit::Day,
            ..Product::default()
        };
        let quote = build_quote(
            &product,
            &QuoteForm {
                start_date: "2025-03-01T10:00".to_string(),
                end_date: "2025-03-03T11:00".to_string(),
                quantity: Some(2),
            },
        );
        assert_eq!(quote.total.as_deref(), Some("$600.00"));
        assert!(quote.message.is_none());
    }

    #[test]
    fn test_quote_reports_problems() {
        let product = Product {
            price_per_day: Some(Decimal::from(100)),
            ..Product::default()
        };
        let missing = build_quote(&product, &QuoteForm::default());
        assert_eq!(missing.message.as_deref(), Some("Choose a start and end date"));

        let backwards = build_quote(
            &product,
            &QuoteForm {
                start_date: "2025-03-03".to_string(),
                end_date: "2025-03-01".to_string(),
                quantity: None,
            },
        );
        assert_eq!(
            backwards.message.as_deref(),
            Some("End date must be after start date")
        );
    }

    #[test]
    fn test_sample_cards_are_flagged() {
        let now = Utc::now();
        let card = ProductCard::from_product(&sample::products()[0], now);
        assert!(card.is_sample());
        assert_eq!(card.status, ListingStatus::Live);
    }
}
