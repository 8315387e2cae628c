//! Static content page route handlers.
//!
//! Serves the markdown pages: about, contact and terms.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::NaiveDate;
use tracing::instrument;

use super::Layout;
use crate::filters;
use crate::state::AppState;

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub layout: Layout,
    pub title: String,
    pub description: String,
    pub updated_at: Option<NaiveDate>,
    pub content_html: String,
}

/// Serve a content page by slug.
fn serve_content_page(
    state: &AppState,
    layout: Layout,
    slug: &str,
) -> Result<ContentPageTemplate, StatusCode> {
    let page = state
        .content()
        .get_page(slug)
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(ContentPageTemplate {
        layout,
        title: page.meta.title.clone(),
        description: page.meta.description.clone().unwrap_or_default(),
        updated_at: page.meta.updated_at,
        content_html: page.content_html.clone(),
    })
}

/// Display the About page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip_all)]
pub async fn about(
    State(state): State<AppState>,
    layout: Layout,
) -> Result<impl IntoResponse, StatusCode> {
    serve_content_page(&state, layout, "about")
}

/// Display the Contact page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip_all)]
pub async fn contact(
    State(state): State<AppState>,
    layout: Layout,
) -> Result<impl IntoResponse, StatusCode> {
    serve_content_page(&state, layout, "contact")
}

/// Display the Terms and Conditions page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip_all)]
pub async fn terms(
    State(state): State<AppState>,
    layout: Layout,
) -> Result<impl IntoResponse, StatusCode> {
    serve_content_page(&state, layout, "terms")
}

/// Create the pages routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/terms", get(terms))
}
