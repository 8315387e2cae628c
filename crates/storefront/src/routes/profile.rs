//! Profile completion after registration.
//!
//! New accounts add a phone number, address and picture; sellers also give
//! a business name and GSTIN. The form posts as multipart so the picture
//! can be forwarded to the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use rentalhub_core::validation::ProfileCompletionForm;
use rentalhub_core::{FieldErrors, Role};

use super::Layout;
use super::uploads::{MultipartForm, image_meta};
use crate::backend::ProfileSubmission;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{BackendCookies, RequireAuth, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Profile completion page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/complete.html")]
pub struct CompleteProfileTemplate {
    pub layout: Layout,
    pub form: ProfileCompletionForm,
    pub errors: FieldErrors,
}

impl CompleteProfileTemplate {
    /// Whether the seller fields start out visible.
    #[must_use]
    pub const fn is_seller(&self) -> bool {
        self.form.role.can_sell()
    }
}

/// Display the profile completion form.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn complete_page(RequireAuth(user): RequireAuth, layout: Layout) -> Response {
    if user.role == Role::Admin {
        return Redirect::to(user.home_path()).into_response();
    }

    CompleteProfileTemplate {
        layout,
        form: ProfileCompletionForm {
            role: user.role,
            ..ProfileCompletionForm::default()
        },
        errors: FieldErrors::new(),
    }
    .into_response()
}

/// Handle profile completion.
///
/// # Errors
///
/// Returns an error if the body is not multipart, the backend session has
/// expired, or the session store fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn complete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    layout: Layout,
    mut cookies: BackendCookies,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload = MultipartForm::read(multipart).await?;
    let picture = upload.take_file("profile_pic");

    let role = match upload.text("role").parse::<Role>() {
        Ok(Role::Admin) | Err(_) => user.role,
        Ok(role) => role,
    };
    let form = ProfileCompletionForm {
        role,
        phone: upload.text("phone").trim().to_string(),
        address: upload.text("address").trim().to_string(),
        profile_pic: picture.as_ref().map(image_meta),
        business_name: upload.text("business_name").trim().to_string(),
        gstin: upload.text("gstin").trim().to_uppercase(),
    };

    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(rejected(layout, form, errors));
    }

    let seller = role.can_sell();
    let submission = ProfileSubmission {
        phone: form.phone.clone(),
        address: form.address.clone(),
        is_customer: form.is_customer(),
        business_name: seller.then(|| form.business_name.clone()),
        gst_number: seller.then(|| form.gstin.clone()),
        profile_pic: picture,
    };

    let result = state.backend().complete_profile(&mut cookies, submission).await;
    cookies.save().await?;

    match result {
        Ok(updated) => {
            let session = cookies.session();
            session.insert(session_keys::ROLE_HINT, role).await?;
            let current = CurrentUser::from_backend(&updated, Some(role));
            set_current_user(session, &current).await?;
            tracing::info!(role = %current.role, "Profile completed");
            Ok(Redirect::to(current.home_path()).into_response())
        }
        Err(e) if e.is_auth() => Err(e.into()),
        Err(e) => {
            tracing::info!(error = %e, "Profile rejected");
            let mut errors = e.into_field_errors();
            errors.rename("gst_number", "gstin");
            Ok(rejected(layout, form, errors))
        }
    }
}

fn rejected(layout: Layout, mut form: ProfileCompletionForm, errors: FieldErrors) -> Response {
    // The browser cannot re-fill a file input
    form.profile_pic = None;
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        CompleteProfileTemplate {
            layout,
            form,
            errors,
        },
    )
        .into_response()
}
