//! Catalog inspection commands.
//!
//! # Environment Variables
//!
//! - `RENTALHUB_API_URL` - Origin of the rental backend
//! - `RH_CLI_USERNAME` / `RH_CLI_PASSWORD` - Account used to read the catalog

use chrono::Utc;
use rentalhub_core::PageRequest;
use rentalhub_core::pagination::DEFAULT_LIMIT;
use rentalhub_storefront::backend::BackendSession;

use super::{CommandError, backend_client, required_env};

/// Sign in and print one page of the product listing.
///
/// # Errors
///
/// Returns an error if credentials are missing or a backend call fails.
pub async fn list(
    search: Option<&str>,
    category: Option<&str>,
    page: u32,
) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let username = required_env("RH_CLI_USERNAME")?;
    let password = required_env("RH_CLI_PASSWORD")?;

    let client = backend_client()?;
    let mut session = BackendSession::default();
    let user = client.login(&mut session, &username, &password).await?;
    tracing::info!("Signed in as {} ({})", user.username, user.role());

    let request = PageRequest::new(page, DEFAULT_LIMIT)
        .with_search(search)
        .with_category(category);
    let result = client.products(&mut session, &request, false).await?;

    let now = Utc::now();
    #[allow(clippy::print_stdout)]
    {
        println!("{:>6}  {:<12}  {:<14}  {:<10}  TITLE", "ID", "STATUS", "PRICE", "OWNER");
        for product in &result.items {
            println!(
                "{:>6}  {:<12}  {:<14}  {:<10}  {}",
                product.id,
                product.status(now).label(),
                product.price_label(),
                product.owner,
                product.title
            );
        }
        match (result.total, result.next_page()) {
            (Some(total), _) => println!("page {} · {} of {total} products", result.page, result.items.len()),
            (None, Some(next)) => println!("page {} · more on page {next}", result.page),
            (None, None) => println!("page {} · end of listing", result.page),
        }
    }

    if let Err(e) = client.logout(&mut session).await {
        tracing::warn!(error = %e, "Logout failed");
    }
    Ok(())
}
