//! Account route handlers.
//!
//! Shows the signed-in user's details and rentals, and deletes the account.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use rentalhub_core::validation::checkbox;

use super::Layout;
use crate::backend::Transaction;
use crate::error::{AppError, clear_sentry_user};
use crate::filters;
use crate::middleware::{BackendCookies, RequireAuth};
use crate::models::CurrentUser;
use crate::state::AppState;

/// A rental as listed on the account and seller pages.
#[derive(Debug, Clone)]
pub struct RentalRow {
    pub product_name: String,
    /// The other party: owner for renters, renter for owners.
    pub counterparty: String,
    pub period: String,
    pub status: String,
    pub open: bool,
}

impl RentalRow {
    #[must_use]
    pub fn for_renter(t: &Transaction) -> Self {
        Self::build(t, &t.owner_name)
    }

    #[must_use]
    pub fn for_owner(t: &Transaction) -> Self {
        Self::build(t, &t.renter_name)
    }

    fn build(t: &Transaction, counterparty: &str) -> Self {
        Self {
            product_name: if t.product_name.is_empty() {
                format!("Product #{}", t.product)
            } else {
                t.product_name.clone()
            },
            counterparty: counterparty.to_string(),
            period: format!(
                "{} to {}",
                t.start_date.format("%b %-d, %Y"),
                t.end_date.format("%b %-d, %Y")
            ),
            status: t.status_label().to_string(),
            open: t.status.is_open(),
        }
    }
}

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub layout: Layout,
    pub user: CurrentUser,
    pub rentals: Vec<RentalRow>,
    pub rentals_error: Option<String>,
    pub delete_error: Option<String>,
}

/// Account deletion form.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default, deserialize_with = "checkbox")]
    pub confirm: bool,
}

/// Display the account page.
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
) -> Result<AccountTemplate, AppError> {
    let result = state.backend().customer_transactions(&mut cookies).await;
    cookies.save().await?;

    let (rentals, rentals_error) = match result {
        Ok(transactions) => (transactions.iter().map(RentalRow::for_renter).collect(), None),
        Err(e) if e.is_auth() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load rentals");
            (Vec::new(), Some("Couldn't load your rentals right now.".to_string()))
        }
    };

    Ok(AccountTemplate {
        layout,
        user,
        rentals,
        rentals_error,
        delete_error: None,
    })
}

/// Delete the account and end the session.
///
/// # Errors
///
/// Returns an error if the backend session has expired or the session
/// store fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    layout: Layout,
    mut cookies: BackendCookies,
    Form(form): Form<DeleteForm>,
) -> Result<Response, AppError> {
    let failed = |message: &str| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            AccountTemplate {
                layout: layout.clone(),
                user: user.clone(),
                rentals: Vec::new(),
                rentals_error: None,
                delete_error: Some(message.to_string()),
            },
        )
            .into_response()
    };

    if !form.confirm {
        return Ok(failed("Tick the box to confirm you want to delete your account."));
    }

    let result = state.backend().delete_account(&mut cookies).await;
    match result {
        Ok(()) => {
            tracing::info!("Account deleted");
            cookies.session().flush().await?;
            clear_sentry_user();
            Ok(Redirect::to("/auth/login?notice=deleted").into_response())
        }
        Err(e) if e.is_auth() => Err(e.into()),
        Err(e) => {
            cookies.save().await?;
            tracing::warn!(error = %e, "Account deletion failed");
            Ok(failed("Couldn't delete your account. Please try again."))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rentalhub_core::{ProductId, TransactionId, TransactionStatus, UserId};

    use super::*;

    fn transaction(status: TransactionStatus) -> Transaction {
        Transaction {
            id: TransactionId::new(1),
            product: ProductId::new(9),
            product_name: String::new(),
            owner: UserId::new(2),
            owner_name: "ravi".to_string(),
            renter: UserId::new(3),
            renter_name: "asha".to_string(),
            start_date: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap(),
            status,
            status_display: None,
            created_at: None,
        }
    }

    #[test]
    fn test_rental_rows() {
        let t = transaction(TransactionStatus::PickedUp);
        let renter = RentalRow::for_renter(&t);
        assert_eq!(renter.product_name, "Product #9");
        assert_eq!(renter.counterparty, "ravi");
        assert_eq!(renter.period, "Mar 1, 2025 to Mar 4, 2025");
        assert_eq!(renter.status, "Picked Up");
        assert!(renter.open);

        let owner = RentalRow::for_owner(&transaction(TransactionStatus::Returned));
        assert_eq!(owner.counterparty, "asha");
        assert!(!owner.open);
    }
}
