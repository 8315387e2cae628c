//! Markdown content pages (about, contact, terms).
//!
//! Pages are loaded from `content/pages/*.md` at startup, their YAML
//! frontmatter parsed and the body rendered to HTML once.
//!
//! # Shortcodes
//!
//! `{{button "Browse rentals" href="/products"}}` renders a call-to-action
//! link styled like the site's primary buttons.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use regex::Regex;
use serde::Deserialize;

/// Frontmatter of a content page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// A rendered page with metadata and HTML content.
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// Content store that holds all loaded pages in memory.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

impl ContentStore {
    /// Load all pages below `content_dir/pages`.
    ///
    /// A missing directory yields an empty store; a page that fails to parse
    /// is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the pages directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Pages directory does not exist: {:?}", dir);
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match load_page(&path) {
                    Ok(page) => {
                        tracing::info!("Loaded page: {}", page.slug);
                        pages.insert(page.slug.clone(), page);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load page {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    /// Get a page by slug
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// Number of loaded pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn load_page(path: &Path) -> Result<Page, ContentError> {
    let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

    let slug = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?
        .to_string();

    parse_page(slug, &content)
}

fn parse_page(slug: String, content: &str) -> Result<Page, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(content)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    Ok(Page {
        slug,
        meta,
        content_html: render_markdown(&parsed.content),
    })
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let processed = process_shortcodes(content);

    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    // Shortcodes emit raw HTML
    options.render.r#unsafe = true;

    markdown_to_html(&processed, &options)
}

// =============================================================================
// Shortcode Processing
// =============================================================================

/// Matches `{{button "Label" href="/path"}}`.
static BUTTON_SHORTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{\{button\s+"([^"]+)"([^}]*)\}\}"#).expect("Invalid regex"));

/// Regex for extracting key="value" attributes.
static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)""#).expect("Invalid regex"));

fn process_shortcodes(content: &str) -> String {
    BUTTON_SHORTCODE_RE
        .replace_all(content, |caps: &regex::Captures| {
            let label = escape_html(&caps[1]);
            let attrs = caps.get(2).map_or("", |m| m.as_str());

            let mut href = "/".to_string();
            let mut style = "primary".to_string();
            for attr in ATTR_RE.captures_iter(attrs) {
                match &attr[1] {
                    "href" => href = escape_html(&attr[2]),
                    "style" => style = escape_html(&attr[2]),
                    _ => {}
                }
            }

            format!(r#"<a class="btn btn-{style}" href="{href}">{label}</a>"#)
        })
        .into_owned()
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}
