//! Seller product listing form.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FieldErrors;
use crate::{RentalRates, RentalUnit};

/// Upper bound for a single uploaded image (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// A product can carry a main image and two more.
pub const MAX_PRODUCT_IMAGES: usize = 3;

/// Metadata of an uploaded image, checked before the bytes are forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

impl ImageUpload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, size: usize) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size,
        }
    }

    /// Why this upload is unacceptable, if it is.
    #[must_use]
    pub fn problem(&self) -> Option<&'static str> {
        if !self.content_type.starts_with("image/") {
            Some("Only image files are allowed")
        } else if self.size > MAX_IMAGE_BYTES {
            Some("Images must be 5MB or smaller")
        } else if self.size == 0 {
            Some("Image file is empty")
        } else {
            None
        }
    }
}

/// A new rental listing as entered by a seller.
///
/// Prices and dates stay as entered so the form can be re-rendered
/// unchanged when validation fails.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub pickup_address: String,
    pub price_unit: RentalUnit,
    pub price_per_hour: String,
    pub price_per_day: String,
    pub price_per_week: String,
    pub price_per_month: String,
    pub price_per_year: String,
    pub pickup_date: String,
    pub expiration_date: String,
    pub images: Vec<ImageUpload>,
}

impl ProductDraft {
    /// Raw price input for `unit`.
    #[must_use]
    pub fn price_input(&self, unit: RentalUnit) -> &str {
        match unit {
            RentalUnit::Hour => &self.price_per_hour,
            RentalUnit::Day => &self.price_per_day,
            RentalUnit::Week => &self.price_per_week,
            RentalUnit::Month => &self.price_per_month,
            RentalUnit::Year => &self.price_per_year,
        }
    }

    /// Form field name holding the price for `unit`.
    #[must_use]
    pub fn price_field(unit: RentalUnit) -> &'static str {
        match unit {
            RentalUnit::Hour => "price_per_hour",
            RentalUnit::Day => "price_per_day",
            RentalUnit::Week => "price_per_week",
            RentalUnit::Month => "price_per_month",
            RentalUnit::Year => "price_per_year",
        }
    }

    /// Prices that parse as positive decimals. Blank and invalid entries
    /// are left unset.
    #[must_use]
    pub fn rates(&self) -> RentalRates {
        let mut rates = RentalRates::default();
        for unit in RentalUnit::ALL {
            rates.set(unit, parse_price(self.price_input(unit)).ok().flatten());
        }
        rates
    }

    #[must_use]
    pub fn pickup_at(&self) -> Option<DateTime<Utc>> {
        parse_form_datetime(&self.pickup_date)
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        parse_form_datetime(&self.expiration_date)
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.title.trim().is_empty() {
            errors.add("title", "Product title is required");
        }
        if self.description.trim().is_empty() {
            errors.add("description", "Product description is required");
        }
        if self.pickup_address.trim().is_empty() {
            errors.add("pickup_address", "Pickup address is required");
        }

        for unit in RentalUnit::ALL {
            let field = Self::price_field(unit);
            let selected = unit == self.price_unit;
            match (parse_price(self.price_input(unit)), selected) {
                (Ok(Some(_)), _) | (Ok(None), false) => {}
                (_, true) => errors.add(field, "Valid price is required"),
                (Err(()), false) => errors.add(field, "Price must be a number greater than 0"),
            }
        }

        let pickup = check_date(
            &self.pickup_date,
            "pickup_date",
            "Pickup date is required",
            &mut errors,
        );
        let expiry = check_date(
            &self.expiration_date,
            "expiration_date",
            "Expiration date is required",
            &mut errors,
        );
        if let (Some(pickup), Some(expiry)) = (pickup, expiry)
            && expiry < pickup
        {
            errors.add("expiration_date", "Expiration date cannot be before pickup date");
        }

        if self.images.is_empty() {
            errors.add("images", "At least one image is required");
        } else if self.images.len() > MAX_PRODUCT_IMAGES {
            errors.add("images", "You can upload at most 3 images");
        }
        for image in &self.images {
            if let Some(message) = image.problem() {
                errors.add("images", message);
            }
        }

        errors
    }
}

fn check_date(
    raw: &str,
    field: &str,
    missing: &str,
    errors: &mut FieldErrors,
) -> Option<DateTime<Utc>> {
    if raw.trim().is_empty() {
        errors.add(field, missing);
        return None;
    }
    let parsed = parse_form_datetime(raw);
    if parsed.is_none() {
        errors.add(field, "Enter a valid date");
    }
    parsed
}

/// `Ok(None)` for blank input, `Err` for anything that is not a positive
/// decimal.
fn parse_price(raw: &str) -> Result<Option<Decimal>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match Decimal::from_str(raw) {
        Ok(price) if price > Decimal::ZERO => Ok(Some(price)),
        _ => Err(()),
    }
}

/// Parse a date from an HTML `date` or `datetime-local` input, or an
/// RFC 3339 timestamp. Dates without a time mean midnight UTC.
#[must_use]
pub fn parse_form_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
