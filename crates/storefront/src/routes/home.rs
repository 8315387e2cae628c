//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use chrono::Utc;
use tracing::instrument;

use super::Layout;
use super::products::{CategoryOption, ProductCard, category_options};
use crate::backend::sample;
use crate::filters;

// =============================================================================
// Landing Content
// =============================================================================

/// A selling point on the landing page.
#[derive(Clone, Copy)]
pub struct Feature {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// A numbered "how it works" step.
#[derive(Clone, Copy)]
pub struct Step {
    pub title: &'static str,
    pub description: &'static str,
}

/// A headline figure.
#[derive(Clone, Copy)]
pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
}

const FEATURES: &[Feature] = &[
    Feature {
        icon: "📦",
        title: "Vast Inventory",
        description: "Electronics, furniture, tools and event gear from sellers near you.",
    },
    Feature {
        icon: "⚡",
        title: "Instant Booking",
        description: "Pick your dates, see the price right away and reserve in a few clicks.",
    },
    Feature {
        icon: "💰",
        title: "Flexible Pricing",
        description: "Hourly, daily, weekly or monthly rates. Rent for exactly as long as you need.",
    },
    Feature {
        icon: "🛡️",
        title: "Verified Listings",
        description: "Every listing is reviewed by our team before it goes live.",
    },
];

const STEPS: &[Step] = &[
    Step {
        title: "Browse & Select",
        description: "Search the catalog and find what you need for your project or event.",
    },
    Step {
        title: "Book & Pay",
        description: "Choose your rental period and pay securely. Confirmation is instant.",
    },
    Step {
        title: "Pick Up",
        description: "Collect from the seller's pickup address at the agreed time.",
    },
    Step {
        title: "Enjoy & Return",
        description: "Use it worry-free, then return it when your rental ends.",
    },
];

const STATS: &[Stat] = &[
    Stat {
        value: "10K+",
        label: "Rental Items",
    },
    Stat {
        value: "98%",
        label: "Customer Satisfaction",
    },
    Stat {
        value: "24/7",
        label: "Customer Support",
    },
    Stat {
        value: "500+",
        label: "Cities Covered",
    },
];

/// Number of showcase cards on the landing page.
const SHOWCASE_SIZE: usize = 3;

// =============================================================================
// Templates
// =============================================================================

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub features: &'static [Feature],
    pub steps: &'static [Step],
    pub stats: &'static [Stat],
    pub categories: Vec<CategoryOption>,
    pub showcase: Vec<ProductCard>,
}

/// Display the landing page.
#[instrument(skip_all)]
pub async fn home(layout: Layout) -> impl IntoResponse {
    let now = Utc::now();
    let showcase = sample::products()
        .iter()
        .take(SHOWCASE_SIZE)
        .map(|p| ProductCard::from_product(p, now))
        .collect();

    HomeTemplate {
        layout,
        features: FEATURES,
        steps: STEPS,
        stats: STATS,
        categories: category_options(None),
        showcase,
    }
}
