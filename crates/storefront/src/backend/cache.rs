//! Cache types for backend responses.

use rentalhub_core::{Page, PageRequest, ProductId};

use super::types::Product;

/// Cache key for product data.
///
/// Only data every signed-in customer sees identically is cached: approved
/// listing pages without a search term, and live products.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products {
        page: u32,
        limit: u32,
        category: Option<String>,
    },
}

impl CacheKey {
    /// Key for a listing page, or `None` when the request is not cacheable.
    pub fn for_listing(request: &PageRequest) -> Option<Self> {
        if request.search().is_some() {
            return None;
        }
        Some(Self::Products {
            page: request.page(),
            limit: request.limit(),
            category: request.category().map(str::to_owned),
        })
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Page<Product>),
}
