//! Session store commands.
//!
//! # Usage
//!
//! ```bash
//! rh-cli sessions migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use secrecy::SecretString;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use rentalhub_storefront::db::create_pool;

/// Errors that can occur while preparing the session store.
#[derive(Debug, Error)]
pub enum SessionsError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or migration error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create the `tower_sessions.session` table if it does not exist.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the migration fails.
pub async fn migrate() -> Result<(), SessionsError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| SessionsError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    let pool = create_pool(&SecretString::from(database_url)).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Session store ready");
    Ok(())
}
