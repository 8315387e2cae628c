//! Seller dashboard route handlers.
//!
//! Sellers see their own listings with moderation status, the rentals of
//! their products, and can submit new listings for approval.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use rentalhub_core::validation::ProductDraft;
use rentalhub_core::{FieldErrors, ListingStatus, RentalUnit};

use super::Layout;
use super::account::RentalRow;
use super::products::ProductCard;
use super::uploads::{MultipartForm, image_meta};
use crate::backend::ProductSubmission;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{BackendCookies, RequireSeller};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Listing counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingCounts {
    pub live: usize,
    pub pending: usize,
    pub rejected: usize,
    pub expired: usize,
}

impl ListingCounts {
    fn of(cards: &[ProductCard]) -> Self {
        cards.iter().fold(Self::default(), |mut counts, card| {
            match card.status {
                ListingStatus::Live => counts.live += 1,
                ListingStatus::Pending => counts.pending += 1,
                ListingStatus::Rejected => counts.rejected += 1,
                ListingStatus::Expired => counts.expired += 1,
            }
            counts
        })
    }
}

/// One price input on the new listing form.
#[derive(Debug, Clone)]
pub struct PriceInput {
    pub unit: RentalUnit,
    pub field: &'static str,
    pub value: String,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub created: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Seller dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "seller/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub listings: Vec<ProductCard>,
    pub counts: ListingCounts,
    pub listings_error: Option<String>,
    pub rentals: Vec<RentalRow>,
    pub rentals_error: Option<String>,
    pub notice: Option<String>,
}

/// New listing form template.
#[derive(Template, WebTemplate)]
#[template(path = "seller/new_product.html")]
pub struct NewProductTemplate {
    pub layout: Layout,
    pub draft: ProductDraft,
    pub prices: Vec<PriceInput>,
    pub units: &'static [RentalUnit],
    pub errors: FieldErrors,
}

impl NewProductTemplate {
    fn new(layout: Layout, draft: ProductDraft, errors: FieldErrors) -> Self {
        let prices = RentalUnit::ALL
            .into_iter()
            .map(|unit| {
                let field = ProductDraft::price_field(unit);
                PriceInput {
                    unit,
                    field,
                    value: draft.price_input(unit).to_string(),
                    error: errors.first(field).map(str::to_owned),
                }
            })
            .collect();

        Self {
            layout,
            draft,
            prices,
            units: &RentalUnit::ALL,
            errors,
        }
    }

    #[must_use]
    pub fn unit_selected(&self, unit: &RentalUnit) -> bool {
        self.draft.price_unit == *unit
    }
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the seller dashboard.
///
/// # Errors
///
/// Returns an error if the backend session has expired or the session
/// store fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireSeller(user): RequireSeller,
    layout: Layout,
    mut cookies: BackendCookies,
    Query(query): Query<DashboardQuery>,
) -> Result<DashboardTemplate, AppError> {
    let now = Utc::now();

    let listings = state
        .backend()
        .products_owned_by(&mut cookies, &user.username)
        .await;
    cookies.save().await?;
    let (listings, listings_error) = match listings {
        Ok(products) => (
            products
                .iter()
                .map(|p| ProductCard::from_product(p, now))
                .collect::<Vec<_>>(),
            None,
        ),
        Err(e) if e.is_auth() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load seller listings");
            (Vec::new(), Some("Couldn't load your listings right now.".to_string()))
        }
    };

    let rentals = state.backend().seller_transactions(&mut cookies).await;
    cookies.save().await?;
    let (rentals, rentals_error) = match rentals {
        Ok(transactions) => (transactions.iter().map(RentalRow::for_owner).collect(), None),
        Err(e) if e.is_auth() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load seller rentals");
            (Vec::new(), Some("Couldn't load rentals right now.".to_string()))
        }
    };

    Ok(DashboardTemplate {
        layout,
        counts: ListingCounts::of(&listings),
        listings,
        listings_error,
        rentals,
        rentals_error,
        notice: query
            .created
            .map(|_| "Listing submitted. It goes live once an admin approves it.".to_string()),
    })
}

/// Display the new listing form.
pub async fn new_product(RequireSeller(_user): RequireSeller, layout: Layout) -> impl IntoResponse {
    NewProductTemplate::new(layout, ProductDraft::default(), FieldErrors::new())
}

/// Handle a new listing.
///
/// # Errors
///
/// Returns an error if the body is not multipart, the backend session has
/// expired, or the session store fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireSeller(user): RequireSeller,
    layout: Layout,
    mut cookies: BackendCookies,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload = MultipartForm::read(multipart).await?;
    let images = upload.take_files("images");

    let draft = ProductDraft {
        title: upload.text("title"),
        description: upload.text("description"),
        pickup_address: upload.text("pickup_address"),
        price_unit: upload.text("price_unit").parse().unwrap_or_default(),
        price_per_hour: upload.text("price_per_hour"),
        price_per_day: upload.text("price_per_day"),
        price_per_week: upload.text("price_per_week"),
        price_per_month: upload.text("price_per_month"),
        price_per_year: upload.text("price_per_year"),
        pickup_date: upload.text("pickup_date"),
        expiration_date: upload.text("expiration_date"),
        images: images.iter().map(image_meta).collect(),
    };

    let errors = draft.validate();
    if !errors.is_empty() {
        return Ok(rejected(layout, draft, errors));
    }

    let submission = ProductSubmission {
        draft: draft.clone(),
        images,
    };
    let result = state.backend().create_product(&mut cookies, submission).await;
    cookies.save().await?;

    match result {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "Listing created");
            add_breadcrumb("seller", "Listing created", Some(&[("title", &product.title)]));
            Ok(Redirect::to("/seller?created=1").into_response())
        }
        Err(e) if e.is_auth() => Err(e.into()),
        Err(e) => {
            tracing::info!(error = %e, "Listing rejected");
            let mut errors = e.into_field_errors();
            for field in ["main_image", "image_2", "image_3"] {
                errors.rename(field, "images");
            }
            Ok(rejected(layout, draft, errors))
        }
    }
}

fn rejected(layout: Layout, mut draft: ProductDraft, errors: FieldErrors) -> Response {
    draft.images.clear();
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        NewProductTemplate::new(layout, draft, errors),
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rentalhub_core::ProductId;

    use super::*;
    use crate::backend::Product;

    #[test]
    fn test_listing_counts() {
        let now = Utc::now();
        let products = [
            Product {
                is_approved: true,
                ..Product::default()
            },
            Product::default(),
            Product {
                is_rejected: true,
                rejection_reason: Some("Blurry photos".to_string()),
                ..Product::default()
            },
            Product {
                id: ProductId::new(4),
                is_approved: true,
                is_active: false,
                ..Product::default()
            },
        ];
        let cards: Vec<_> = products
            .iter()
            .map(|p| ProductCard::from_product(p, now))
            .collect();

        assert_eq!(
            ListingCounts::of(&cards),
            ListingCounts {
                live: 1,
                pending: 1,
                rejected: 1,
                expired: 1,
            }
        );
    }

    #[test]
    fn test_price_inputs_carry_errors() {
        let mut errors = FieldErrors::new();
        errors.add("price_per_day", "Valid price is required");
        let draft = ProductDraft {
            price_per_week: "700".to_string(),
            ..ProductDraft::default()
        };
        let template = NewProductTemplate::new(Layout::default(), draft, errors);

        assert_eq!(template.prices.len(), 5);
        let day = template.prices.iter().find(|p| p.unit == RentalUnit::Day).unwrap();
        assert_eq!(day.error.as_deref(), Some("Valid price is required"));
        let week = template.prices.iter().find(|p| p.unit == RentalUnit::Week).unwrap();
        assert_eq!(week.value, "700");
        assert!(template.unit_selected(&RentalUnit::Day));
    }
}
