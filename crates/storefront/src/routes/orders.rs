//! Checkout and payment verification.
//!
//! Checkout turns the priced wishlist entries into a backend order and
//! renders the Razorpay payment page. Razorpay's success handler posts the
//! payment ids back to `/orders/verify`, which forwards them with the order
//! lines kept in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use rentalhub_core::{WishlistItemId, format_money};

use super::Layout;
use super::wishlist::{WishlistContent, WishlistTemplate};
use crate::backend::{NewOrder, OrderLine, PaymentVerification, WishlistItem};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{BackendCookies, RequireAuth};
use crate::models::session_keys;
use crate::state::AppState;

/// Currency charged through Razorpay.
pub const CURRENCY: &str = "USD";

/// An order created at checkout, awaiting Razorpay's confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingOrder {
    pub order_id: String,
    pub items: Vec<OrderLine>,
    /// Wishlist entries the order was built from.
    pub wishlist_ids: Vec<WishlistItemId>,
}

/// Fields Razorpay hands to the success handler.
#[derive(Debug, Deserialize)]
pub struct RazorpayCallback {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Razorpay payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/checkout.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub order_id: String,
    /// Amount in cents, as Razorpay expects.
    pub amount_subunits: String,
    pub total: String,
    pub currency: &'static str,
    pub item_count: usize,
    pub key_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
}

/// Payment outcome page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/complete.html")]
pub struct OrderCompleteTemplate {
    pub layout: Layout,
    pub ok: bool,
    pub message: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// Order lines for every wishlist entry with a known price.
fn order_lines(items: &[WishlistItem]) -> (Vec<OrderLine>, Vec<WishlistItemId>) {
    items
        .iter()
        .filter_map(|item| {
            let line = item.line();
            line.unit_price.map(|price| {
                (
                    OrderLine {
                        product_id: item.product_id(),
                        quantity: line.quantity,
                        price,
                    },
                    item.id,
                )
            })
        })
        .unzip()
}

fn order_total(lines: &[OrderLine]) -> Decimal {
    lines
        .iter()
        .map(|line| line.price * Decimal::from(line.quantity))
        .sum()
}

fn wishlist_with_error(layout: Layout, items: &[WishlistItem], message: &str) -> Response {
    let mut content = WishlistContent::new(items, "");
    content.error = Some(message.to_string());
    WishlistTemplate { layout, content }.into_response()
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Create an order from the wishlist and render the payment page.
///
/// # Errors
///
/// Returns an error if the wishlist cannot be loaded or the session store
/// fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    layout: Layout,
    mut cookies: BackendCookies,
) -> Result<Response, AppError> {
    let result = state.backend().wishlist(&mut cookies).await;
    cookies.save().await?;
    let items = result?;

    let (lines, wishlist_ids) = order_lines(&items);
    if lines.is_empty() {
        return Ok(wishlist_with_error(
            layout,
            &items,
            "Your wishlist has no priced items to check out.",
        ));
    }

    let order = NewOrder {
        total_amount: order_total(&lines),
        items: lines,
    };
    let result = state.backend().create_order(&mut cookies, &order).await;
    cookies.save().await?;

    let created = match result {
        Ok(created) => created,
        Err(e) if e.is_auth() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Order creation failed");
            return Ok(wishlist_with_error(
                layout,
                &items,
                "Failed to start the payment. Please try again.",
            ));
        }
    };

    tracing::info!(order_id = %created.order_id, items = order.items.len(), "Order created");
    cookies
        .session()
        .insert(
            session_keys::PENDING_ORDER,
            PendingOrder {
                order_id: created.order_id.clone(),
                items: order.items.clone(),
                wishlist_ids,
            },
        )
        .await?;

    let key_id = state.config().razorpay_key_id.clone();
    if key_id.is_none() {
        tracing::warn!("RAZORPAY_KEY_ID is not set, payment page cannot open checkout");
    }

    Ok(CheckoutTemplate {
        amount_subunits: (created.amount * Decimal::ONE_HUNDRED).round().to_string(),
        total: format_money(created.amount),
        currency: CURRENCY,
        item_count: order.items.len(),
        key_id,
        customer_name: user.display_name().to_string(),
        customer_email: user.email.clone(),
        order_id: created.order_id,
        layout,
    }
    .into_response())
}

/// Verify a completed Razorpay payment.
///
/// On success the ordered entries are removed from the wishlist.
///
/// # Errors
///
/// Returns `BadRequest` when the order was not started in this session, or
/// an error if the session store fails.
#[instrument(skip_all, fields(user_id = %user.id, order_id = %callback.razorpay_order_id))]
pub async fn verify(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    layout: Layout,
    mut cookies: BackendCookies,
    Form(callback): Form<RazorpayCallback>,
) -> Result<Response, AppError> {
    let pending = cookies
        .session()
        .get::<PendingOrder>(session_keys::PENDING_ORDER)
        .await?
        .filter(|p| p.order_id == callback.razorpay_order_id)
        .ok_or_else(|| AppError::BadRequest("Unknown order".to_string()))?;

    let verification = PaymentVerification {
        razorpay_order_id: callback.razorpay_order_id,
        razorpay_payment_id: callback.razorpay_payment_id,
        razorpay_signature: callback.razorpay_signature,
        items: pending.items,
    };
    let result = state.backend().verify_payment(&mut cookies, &verification).await;
    cookies.save().await?;

    match result {
        Ok(_) => {
            tracing::info!("Payment verified");
            cookies
                .session()
                .remove::<PendingOrder>(session_keys::PENDING_ORDER)
                .await?;

            for id in pending.wishlist_ids {
                if let Err(e) = state.backend().remove_from_wishlist(&mut cookies, id).await {
                    tracing::warn!(error = %e, item_id = %id, "Failed to clear paid wishlist entry");
                }
            }
            cookies.save().await?;

            Ok(OrderCompleteTemplate {
                layout,
                ok: true,
                message: "Payment successful! Your rentals have been confirmed.".to_string(),
            }
            .into_response())
        }
        Err(e) if e.is_auth() => Err(e.into()),
        Err(e) => {
            tracing::error!(error = %e, "Payment verification failed");
            Ok(OrderCompleteTemplate {
                layout,
                ok: false,
                message: "Payment verification failed. Please contact support.".to_string(),
            }
            .into_response())
        }
    }
}
