//! Profile completion form.

use std::sync::LazyLock;

use regex::Regex;

use super::{FieldErrors, ImageUpload};
use crate::Role;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("Invalid regex"));

static GSTIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}[A-Z]{5}\d{4}[A-Z][A-Z\d]Z[A-Z\d]$").expect("Invalid regex")
});

pub const MIN_ADDRESS_LENGTH: usize = 7;

/// Details collected after registration. Sellers also supply business
/// details.
#[derive(Debug, Clone, Default)]
pub struct ProfileCompletionForm {
    pub role: Role,
    pub phone: String,
    pub address: String,
    pub profile_pic: Option<ImageUpload>,
    pub business_name: String,
    pub gstin: String,
}

impl ProfileCompletionForm {
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if !PHONE_RE.is_match(self.phone.trim()) {
            errors.add("phone", "Enter a valid 10-digit phone number");
        }

        if self.address.trim().chars().count() < MIN_ADDRESS_LENGTH {
            errors.add("address", "Enter your full address");
        }

        match &self.profile_pic {
            None => errors.add("profile_pic", "Please upload a profile picture"),
            Some(upload) => {
                if let Some(message) = upload.problem() {
                    errors.add("profile_pic", message);
                }
            }
        }

        if self.role.can_sell() {
            if self.business_name.trim().chars().count() < 2 {
                errors.add("business_name", "Business Name is required");
            }
            if !GSTIN_RE.is_match(self.gstin.trim()) {
                errors.add("gstin", "Enter valid GSTIN (15 chars, Eg: 27ABCDE1234F2Z5)");
            }
        }

        errors
    }

    /// Whether the profile belongs to a renting customer.
    #[must_use]
    pub fn is_customer(&self) -> bool {
        !self.role.can_sell()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn picture() -> ImageUpload {
        ImageUpload::new("me.png", "image/png", 20_000)
    }

    fn customer() -> ProfileCompletionForm {
        ProfileCompletionForm {
            role: Role::Customer,
            phone: "9876543210".to_string(),
            address: "12 MG Road, Pune".to_string(),
            profile_pic: Some(picture()),
            ..ProfileCompletionForm::default()
        }
    }

    #[test]
    fn test_customer_valid_without_business_fields() {
        assert!(customer().validate().is_empty());
    }

    #[test]
    fn test_phone_must_be_ten_digits() {
        for phone in ["", "12345", "98765432101", "98765-4321"] {
            let mut form = customer();
            form.phone = phone.to_string();
            assert_eq!(
                form.validate().first("phone"),
                Some("Enter a valid 10-digit phone number"),
                "phone {phone:?}"
            );
        }
    }

    #[test]
    fn test_address_and_picture_required() {
        let mut form = customer();
        form.address = "  Pune  ".to_string();
        form.profile_pic = None;
        let errors = form.validate();
        assert_eq!(errors.first("address"), Some("Enter your full address"));
        assert_eq!(
            errors.first("profile_pic"),
            Some("Please upload a profile picture")
        );
    }

    #[test]
    fn test_seller_business_fields() {
        let mut form = customer();
        form.role = Role::Seller;
        let errors = form.validate();
        assert_eq!(errors.first("business_name"), Some("Business Name is required"));
        assert_eq!(
            errors.first("gstin"),
            Some("Enter valid GSTIN (15 chars, Eg: 27ABCDE1234F2Z5)")
        );

        form.business_name = "Rao Rentals".to_string();
        form.gstin = "27ABCDE1234F2Z5".to_string();
        assert!(form.validate().is_empty());
        assert!(!form.is_customer());
    }

    #[test]
    fn test_gstin_rejects_lowercase() {
        let mut form = customer();
        form.role = Role::Seller;
        form.business_name = "Rao Rentals".to_string();
        form.gstin = "27abcde1234f2z5".to_string();
        assert!(form.validate().contains("gstin"));
    }

    #[test]
    fn test_picture_must_be_image() {
        let mut form = customer();
        form.profile_pic = Some(ImageUpload::new("cv.pdf", "application/pdf", 100));
        assert!(form.validate().contains("profile_pic"));
    }
}
