//! JSON shapes exchanged with the rental backend.
//!
//! The backend owns every entity; these types mirror its serializers.
//! Missing fields fall back to defaults and loosely typed values (decimals
//! as strings or numbers, blank dates) are accepted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use rentalhub_core::validation::parse_form_datetime;
use rentalhub_core::{
    ListingStatus, ProductId, QuoteError, RentalRates, RentalUnit, Role, TransactionId,
    TransactionStatus, UserId, WishlistItemId, WishlistLine,
};

// =============================================================================
// Users
// =============================================================================

/// A backend user account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub profile_pic: Option<String>,
    pub is_superuser: bool,
    /// Only present once the profile has been completed.
    pub is_customer: Option<bool>,
}

impl User {
    #[must_use]
    pub const fn role(&self) -> Role {
        Role::from_flags(self.is_superuser, self.is_customer)
    }

    /// Whether the post-registration profile step is still outstanding.
    #[must_use]
    pub fn needs_profile(&self) -> bool {
        !self.is_superuser
            && (self.phone.as_deref().is_none_or(str::is_empty)
                || self.address.as_deref().is_none_or(str::is_empty))
    }

    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// A rental listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: ProductId,
    /// Username of the seller.
    pub owner: String,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub main_image: Option<String>,
    pub image_2: Option<String>,
    pub image_3: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub price_per_hour: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub price_per_day: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub price_per_week: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub price_per_month: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub price_per_year: Option<Decimal>,
    #[serde(deserialize_with = "lenient_unit")]
    pub price_unit: RentalUnit,
    pub pickup_address: Option<String>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub pickup_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub expiration_date: Option<DateTime<Utc>>,
    pub is_approved: bool,
    pub is_rejected: bool,
    pub rejection_reason: Option<String>,
    pub is_active: bool,
    #[serde(deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            id: ProductId::default(),
            owner: String::new(),
            title: String::new(),
            description: String::new(),
            category: None,
            main_image: None,
            image_2: None,
            image_3: None,
            price_per_hour: None,
            price_per_day: None,
            price_per_week: None,
            price_per_month: None,
            price_per_year: None,
            price_unit: RentalUnit::Day,
            pickup_address: None,
            pickup_date: None,
            expiration_date: None,
            is_approved: false,
            is_rejected: false,
            rejection_reason: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Product {
    #[must_use]
    pub fn rates(&self) -> RentalRates {
        RentalRates {
            per_hour: self.price_per_hour,
            per_day: self.price_per_day,
            per_week: self.price_per_week,
            per_month: self.price_per_month,
            per_year: self.price_per_year,
        }
    }

    /// Price for one advertised unit.
    #[must_use]
    pub const fn unit_price(&self) -> Option<Decimal> {
        match self.price_unit {
            RentalUnit::Hour => self.price_per_hour,
            RentalUnit::Day => self.price_per_day,
            RentalUnit::Week => self.price_per_week,
            RentalUnit::Month => self.price_per_month,
            RentalUnit::Year => self.price_per_year,
        }
    }

    /// Display price such as `$240.00/day`.
    #[must_use]
    pub fn price_label(&self) -> String {
        self.rates()
            .headline(self.price_unit)
            .unwrap_or_else(|| "Price on request".to_string())
    }

    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> ListingStatus {
        ListingStatus::derive(
            self.is_approved,
            self.is_rejected,
            self.is_active,
            self.expiration_date,
            now,
        )
    }

    /// Non-empty image URLs, main image first.
    #[must_use]
    pub fn images(&self) -> Vec<&str> {
        [&self.main_image, &self.image_2, &self.image_3]
            .into_iter()
            .filter_map(|img| img.as_deref())
            .filter(|url| !url.trim().is_empty())
            .collect()
    }

    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images().into_iter().next()
    }

    /// Quote renting `quantity` items at the advertised unit.
    ///
    /// # Errors
    ///
    /// See [`RentalRates::quote`].
    pub fn quote(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        quantity: u32,
    ) -> Result<Decimal, QuoteError> {
        self.rates().quote(self.price_unit, start, end, quantity)
    }

    /// Category shown on cards and used by the local filter.
    #[must_use]
    pub fn category_label(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("General")
    }
}

/// Product listing response in any of the shapes the backend returns.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductListing {
    Results {
        results: Vec<Product>,
        #[serde(default)]
        count: Option<u64>,
    },
    Data {
        data: Vec<Product>,
        #[serde(default)]
        total: Option<u64>,
    },
    Bare(Vec<Product>),
}

impl ProductListing {
    /// Items and the reported total, if any.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Product>, Option<u64>) {
        match self {
            Self::Results { results, count } => (results, count),
            Self::Data { data, total } => (data, total),
            Self::Bare(items) => (items, None),
        }
    }
}

// =============================================================================
// Wishlist
// =============================================================================

/// The `product` of a wishlist entry: an id, or the product inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Id(ProductId),
    Full(Box<Product>),
}

impl Default for ProductRef {
    fn default() -> Self {
        Self::Id(ProductId::default())
    }
}

impl ProductRef {
    #[must_use]
    pub const fn id(&self) -> ProductId {
        match self {
            Self::Id(id) => *id,
            Self::Full(product) => product.id,
        }
    }

    #[must_use]
    pub fn product(&self) -> Option<&Product> {
        match self {
            Self::Id(_) => None,
            Self::Full(product) => Some(product),
        }
    }
}

/// One saved product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product: ProductRef,
    pub product_name: Option<String>,
    pub quantity: u32,
    #[serde(deserialize_with = "lenient_datetime")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(alias = "created_at", deserialize_with = "lenient_datetime")]
    pub added_at: Option<DateTime<Utc>>,
}

impl Default for WishlistItem {
    fn default() -> Self {
        Self {
            id: WishlistItemId::default(),
            product: ProductRef::default(),
            product_name: None,
            quantity: 1,
            start_date: None,
            end_date: None,
            added_at: None,
        }
    }
}

impl WishlistItem {
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id()
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.product_name
            .clone()
            .or_else(|| self.product.product().map(|p| p.title.clone()))
            .unwrap_or_else(|| format!("Product #{}", self.product_id()))
    }

    #[must_use]
    pub fn unit_price(&self) -> Option<Decimal> {
        self.product.product().and_then(Product::unit_price)
    }

    #[must_use]
    pub fn line(&self) -> WishlistLine {
        WishlistLine {
            unit_price: self.unit_price(),
            quantity: self.quantity.max(1),
        }
    }
}

/// Wishlist responses are paginated or bare arrays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WishlistListing {
    Results { results: Vec<WishlistItem> },
    Bare(Vec<WishlistItem>),
}

impl WishlistListing {
    #[must_use]
    pub fn into_items(self) -> Vec<WishlistItem> {
        match self {
            Self::Results { results } | Self::Bare(results) => results,
        }
    }
}

/// Body for adding a product to the wishlist.
#[derive(Debug, Clone, Serialize)]
pub struct NewWishlistItem {
    pub product: ProductId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

// =============================================================================
// Transactions & Orders
// =============================================================================

/// A rental transaction between a renter and a product owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub product: ProductId,
    #[serde(default)]
    pub product_name: String,
    pub owner: UserId,
    #[serde(default)]
    pub owner_name: String,
    pub renter: UserId,
    #[serde(default)]
    pub renter_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub status_display: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    #[must_use]
    pub fn status_label(&self) -> &str {
        self.status_display
            .as_deref()
            .unwrap_or_else(|| self.status.label())
    }
}

/// Transaction lists are paginated or bare arrays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TransactionListing {
    Results { results: Vec<Transaction> },
    Bare(Vec<Transaction>),
}

impl TransactionListing {
    #[must_use]
    pub fn into_items(self) -> Vec<Transaction> {
        match self {
            Self::Results { results } | Self::Bare(results) => results,
        }
    }
}

/// One line of an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

/// Body of `POST /api/orders/create/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub items: Vec<OrderLine>,
    pub total_amount: Decimal,
}

/// Response of `POST /api/orders/create/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: String,
    #[serde(deserialize_with = "required_decimal")]
    pub amount: Decimal,
}

/// Payment confirmation posted to `POST /api/orders/verify/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /api/auth/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /api/auth/create-superuser/`.
#[derive(Debug, Clone, Serialize)]
pub struct SuperuserRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub password: &'a str,
    pub secret: &'a str,
}

/// Generic `{detail | message}` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Ack {
    pub detail: Option<String>,
    pub message: Option<String>,
}

// =============================================================================
// Lenient deserializers
// =============================================================================

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(Value::Number(n)) => n.to_string().parse().ok(),
        _ => None,
    })
}

fn required_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_decimal(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("expected a decimal amount"))
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<String>::deserialize(deserializer)? {
        Some(s) => parse_form_datetime(&s),
        None => None,
    })
}

fn lenient_unit<'de, D>(deserializer: D) -> Result<RentalUnit, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}
