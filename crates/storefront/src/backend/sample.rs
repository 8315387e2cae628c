//! Sample listings shown when the backend cannot serve the first page.
//!
//! Sample products use negative ids so they never collide with backend
//! primary keys; pages use [`is_sample`] to hide actions that would need the
//! backend (wishlist, checkout).

use rust_decimal::Decimal;

use rentalhub_core::{ProductId, RentalUnit};

use super::types::Product;

struct Sample {
    title: &'static str,
    category: &'static str,
    per_day: i64,
    image: &'static str,
    description: &'static str,
}

const SAMPLES: [Sample; 6] = [
    Sample {
        title: "Professional DSLR Camera",
        category: "Electronics",
        per_day: 240,
        image: "https://images.unsplash.com/photo-1606983340126-99ab4feaa64a?w=300&h=200&fit=crop",
        description: "Full-frame DSLR with a 24-70mm lens, two batteries and a carry bag.",
    },
    Sample {
        title: "Gaming Laptop RTX 4080",
        category: "Electronics",
        per_day: 180,
        image: "https://images.unsplash.com/photo-1593642702749-b7d2a804fbcf?w=300&h=200&fit=crop",
        description: "High refresh gaming laptop for events, streaming and rendering jobs.",
    },
    Sample {
        title: "Party Sound System",
        category: "Audio",
        per_day: 320,
        image: "https://images.unsplash.com/photo-1493225457124-a3eb161ffa5f?w=300&h=200&fit=crop",
        description: "Two powered speakers, a subwoofer, mixer and wireless microphones.",
    },
    Sample {
        title: "Electric Drill Set",
        category: "Tools",
        per_day: 80,
        image: "https://images.unsplash.com/photo-1572981779307-38b8cabb2407?w=300&h=200&fit=crop",
        description: "Cordless hammer drill with bits, two batteries and a charger.",
    },
    Sample {
        title: "MacBook Pro M3",
        category: "Electronics",
        per_day: 200,
        image: "https://images.unsplash.com/photo-1541807084-5c52b6b3adef?w=300&h=200&fit=crop",
        description: "14-inch MacBook Pro with 18 GB memory, ready for creative work.",
    },
    Sample {
        title: "Wedding Decoration Kit",
        category: "Events",
        per_day: 450,
        image: "https://images.unsplash.com/photo-1519225421980-715cb0215aed?w=300&h=200&fit=crop",
        description: "Arch, drapes, fairy lights and table centrepieces for up to 150 guests.",
    },
];

/// The sample catalog.
#[must_use]
pub fn products() -> Vec<Product> {
    SAMPLES
        .iter()
        .zip(1_i64..)
        .map(|(sample, n)| Product {
            id: ProductId::new(-n),
            owner: "rentalhub".to_string(),
            title: sample.title.to_string(),
            description: sample.description.to_string(),
            category: Some(sample.category.to_string()),
            main_image: Some(sample.image.to_string()),
            price_per_day: Some(Decimal::from(sample.per_day)),
            price_unit: RentalUnit::Day,
            is_approved: true,
            ..Product::default()
        })
        .collect()
}

/// Sample products matching a search term and category, the way the
/// backend filters (case-insensitive title/description match).
#[must_use]
pub fn filtered(search: Option<&str>, category: Option<&str>) -> Vec<Product> {
    let needle = search.map(str::to_lowercase);
    products()
        .into_iter()
        .filter(|p| {
            needle.as_deref().is_none_or(|n| {
                p.title.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
            })
        })
        .filter(|p| category.is_none_or(|c| p.category_label().eq_ignore_ascii_case(c)))
        .collect()
}

/// Look up a sample product.
#[must_use]
pub fn find(id: ProductId) -> Option<Product> {
    if !is_sample(id) {
        return None;
    }
    products().into_iter().find(|p| p.id == id)
}

#[must_use]
pub const fn is_sample(id: ProductId) -> bool {
    id.as_i64() < 0
}
