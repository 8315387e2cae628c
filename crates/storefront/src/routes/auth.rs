//! Authentication route handlers.
//!
//! Login, sign-up and superuser bootstrap forms. Credentials are checked by
//! the rental backend; the storefront validates input first, keeps the
//! backend's session cookies in the user's session and snapshots the user
//! for page rendering.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use rentalhub_core::validation::{AdminSignUpForm, LoginForm, SignUpForm};
use rentalhub_core::{FieldErrors, Role};

use super::Layout;
use crate::backend::{Registration, SuperuserRequest, User};
use crate::error::{AppError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{BackendCookies, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for messages shown above the login form.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// Set after a superuser was created (`admin`) or the account was deleted (`deleted`).
    pub notice: Option<String>,
}

impl LoginQuery {
    fn message(&self) -> Option<String> {
        match self.notice.as_deref()? {
            "admin" => Some("Admin account created. Sign in to continue.".to_string()),
            "deleted" => Some("Your account has been deleted.".to_string()),
            "signed_out" => Some("You have been signed out.".to_string()),
            _ => None,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub form: LoginForm,
    pub errors: FieldErrors,
    pub notice: Option<String>,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignUpTemplate {
    pub layout: Layout,
    pub form: SignUpForm,
    pub errors: FieldErrors,
}

/// Superuser bootstrap page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/admin.html")]
pub struct AdminSignUpTemplate {
    pub layout: Layout,
    pub form: AdminSignUpForm,
    pub errors: FieldErrors,
}

/// Render a template as a form failure.
fn rejected(template: impl IntoResponse) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
}

/// Put a freshly authenticated backend user into the session.
async fn sign_in(session: &Session, user: &User, role_hint: Option<Role>) -> Result<CurrentUser, AppError> {
    // New session id on privilege change
    session.cycle_id().await?;

    let hint = match role_hint {
        Some(role) => {
            session.insert(session_keys::ROLE_HINT, role).await?;
            Some(role)
        }
        None => session.get::<Role>(session_keys::ROLE_HINT).await?,
    };

    let current = CurrentUser::from_backend(user, hint);
    set_current_user(session, &current).await?;
    set_sentry_user(&current.id, &current.username, Some(&current.email));
    add_breadcrumb("auth", "Signed in", Some(&[("role", &current.role.to_string())]));
    Ok(current)
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(layout: Layout, Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        layout,
        form: LoginForm::default(),
        errors: FieldErrors::new(),
        notice: query.message(),
    }
}

/// Handle login form submission.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    layout: Layout,
    mut cookies: BackendCookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(rejected(LoginTemplate {
            layout,
            form,
            errors,
            notice: None,
        }));
    }

    let result = state
        .backend()
        .login(&mut cookies, form.username.trim(), &form.password)
        .await;
    cookies.save().await?;

    match result {
        Ok(user) => {
            let current = sign_in(cookies.session(), &user, None).await?;
            tracing::info!(user_id = %current.id, "User logged in");
            Ok(Redirect::to(current.home_path()).into_response())
        }
        Err(e) => {
            tracing::info!(error = %e, "Login rejected");
            let mut form = form;
            form.password.clear();
            Ok(rejected(LoginTemplate {
                layout,
                form,
                errors: e.into_field_errors(),
                notice: None,
            }))
        }
    }
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
pub async fn signup_page(layout: Layout) -> impl IntoResponse {
    SignUpTemplate {
        layout,
        form: SignUpForm::default(),
        errors: FieldErrors::new(),
    }
}

/// Handle sign-up form submission.
///
/// The backend signs the new account in; the user continues to profile
/// completion.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip_all, fields(username = %form.username, role = %form.role))]
pub async fn signup(
    State(state): State<AppState>,
    layout: Layout,
    mut cookies: BackendCookies,
    Form(form): Form<SignUpForm>,
) -> Result<Response, AppError> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(rejected(SignUpTemplate {
            layout,
            form: scrubbed(form),
            errors,
        }));
    }

    let registration = Registration {
        username: form.username.trim(),
        name: form.full_name.trim(),
        email: form.email.trim(),
        password: &form.password,
    };
    let result = state.backend().register(&mut cookies, &registration).await;
    cookies.save().await?;

    match result {
        Ok(user) => {
            let current = sign_in(cookies.session(), &user, Some(form.role)).await?;
            tracing::info!(user_id = %current.id, "User registered");
            Ok(Redirect::to("/profile/complete").into_response())
        }
        Err(e) => {
            tracing::info!(error = %e, "Registration rejected");
            let mut errors = e.into_field_errors();
            errors.rename("name", "full_name");
            Ok(rejected(SignUpTemplate {
                layout,
                form: scrubbed(form),
                errors,
            }))
        }
    }
}

/// Drop passwords before echoing a form back.
fn scrubbed(mut form: SignUpForm) -> SignUpForm {
    form.password.clear();
    form.confirm_password.clear();
    form
}

// =============================================================================
// Superuser Bootstrap Routes
// =============================================================================

/// Display the superuser bootstrap page.
pub async fn admin_page(layout: Layout) -> impl IntoResponse {
    AdminSignUpTemplate {
        layout,
        form: AdminSignUpForm::default(),
        errors: FieldErrors::new(),
    }
}

/// Handle superuser bootstrap form submission.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn admin_signup(
    State(state): State<AppState>,
    layout: Layout,
    mut cookies: BackendCookies,
    Form(form): Form<AdminSignUpForm>,
) -> Result<Response, AppError> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(rejected(AdminSignUpTemplate {
            layout,
            form: AdminSignUpForm {
                password: String::new(),
                secret_key: String::new(),
                ..form
            },
            errors,
        }));
    }

    let request = SuperuserRequest {
        username: form.username.trim(),
        email: form.email.trim(),
        name: form.name.trim(),
        password: &form.password,
        secret: &form.secret_key,
    };
    let result = state.backend().create_superuser(&mut cookies, &request).await;
    cookies.save().await?;

    match result {
        Ok(_) => {
            tracing::info!("Superuser created");
            Ok(Redirect::to("/auth/login?notice=admin").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Superuser creation rejected");
            let mut errors = e.into_field_errors();
            errors.rename("secret", "secret_key");
            Ok(rejected(AdminSignUpTemplate {
                layout,
                form: AdminSignUpForm {
                    password: String::new(),
                    secret_key: String::new(),
                    ..form
                },
                errors,
            }))
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// The backend session is ended best-effort; the storefront session is
/// discarded either way.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    mut cookies: BackendCookies,
) -> Result<Redirect, AppError> {
    if cookies.has_session()
        && let Err(e) = state.backend().logout(&mut cookies).await
    {
        tracing::warn!(error = %e, "Backend logout failed");
    }

    cookies.session().flush().await?;
    clear_sentry_user();

    Ok(Redirect::to("/auth/login?notice=signed_out"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_notices() {
        let query = LoginQuery {
            notice: Some("admin".to_string()),
        };
        assert!(query.message().unwrap().contains("Admin account created"));
        assert!(LoginQuery::default().message().is_none());
        let unknown = LoginQuery {
            notice: Some("<script>".to_string()),
        };
        assert!(unknown.message().is_none());
    }

    #[test]
    fn test_scrubbed_drops_passwords() {
        let form = scrubbed(SignUpForm {
            username: "asha_k".to_string(),
            password: "Secret123".to_string(),
            confirm_password: "Secret123".to_string(),
            ..SignUpForm::default()
        });
        assert_eq!(form.username, "asha_k");
        assert!(form.password.is_empty());
        assert!(form.confirm_password.is_empty());
    }
}
