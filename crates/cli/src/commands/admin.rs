//! Superuser management commands.
//!
//! # Usage
//!
//! ```bash
//! rh-cli admin create -u admin -e admin@example.com -n "Admin Name"
//! ```
//!
//! # Environment Variables
//!
//! - `RENTALHUB_API_URL` - Origin of the rental backend
//! - `RH_ADMIN_PASSWORD` - Password for the new superuser
//! - `SUPERUSER_SECRET_KEY` - Shared secret the backend checks

use rentalhub_core::validation::AdminSignUpForm;
use rentalhub_storefront::backend::{BackendSession, SuperuserRequest};

use super::{CommandError, backend_client, required_env};

/// Create a backend superuser.
///
/// # Errors
///
/// Returns an error if configuration is missing, the input is invalid, or
/// the backend refuses the request.
pub async fn create_superuser(username: &str, email: &str, name: &str) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let form = AdminSignUpForm {
        email: email.trim().to_owned(),
        username: username.trim().to_owned(),
        name: name.trim().to_owned(),
        password: required_env("RH_ADMIN_PASSWORD")?,
        secret_key: required_env("SUPERUSER_SECRET_KEY")?,
    };

    let errors = form.validate();
    if !errors.is_empty() {
        return Err(CommandError::Invalid(errors.to_string()));
    }

    let client = backend_client()?;
    let mut session = BackendSession::default();

    tracing::info!("Creating superuser: {} ({})", form.username, form.email);
    let ack = client
        .create_superuser(
            &mut session,
            &SuperuserRequest {
                username: &form.username,
                email: &form.email,
                name: &form.name,
                password: &form.password,
                secret: &form.secret_key,
            },
        )
        .await?;

    tracing::info!(
        "Superuser created: {}",
        ack.detail
            .as_deref()
            .or(ack.message.as_deref())
            .unwrap_or("no message from backend")
    );
    tracing::info!("Sign in at /auth/login with the new credentials.");
    Ok(())
}
