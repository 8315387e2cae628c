//! Status enums for rental entities and user roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role a signed-in user acts in.
///
/// The backend exposes `is_superuser` and, once a profile is completed,
/// `is_customer`; the role is derived from those flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Customer,
    Seller,
    Admin,
}

impl Role {
    /// Derive the role from the backend's user flags.
    #[must_use]
    pub const fn from_flags(is_superuser: bool, is_customer: Option<bool>) -> Self {
        if is_superuser {
            Self::Admin
        } else if matches!(is_customer, Some(false)) {
            Self::Seller
        } else {
            Self::Customer
        }
    }

    /// Whether this role may list products for rent.
    #[must_use]
    pub const fn can_sell(self) -> bool {
        matches!(self, Self::Seller | Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Seller => write!(f, "seller"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Rental transaction status.
///
/// Maps to the backend's transaction `status` choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    PickedUp,
    Returned,
    Cancelled,
}

impl TransactionStatus {
    /// Display label, matching the backend's `status_display`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::PickedUp => "Picked Up",
            Self::Returned => "Returned",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether the rented item is still out with (or due to) the renter.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::PickedUp)
    }
}

/// Moderation/lifecycle state of a rental listing, derived from the
/// product's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Approved and active.
    Live,
    /// Awaiting admin approval.
    Pending,
    /// Rejected by an admin.
    Rejected,
    /// Deactivated or past its expiration date.
    Expired,
}

impl ListingStatus {
    /// Derive the listing status. Rejection wins over expiry, expiry over
    /// pending approval.
    #[must_use]
    pub fn derive(
        is_approved: bool,
        is_rejected: bool,
        is_active: bool,
        expiration_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        if is_rejected {
            Self::Rejected
        } else if !is_active || expiration_date.is_some_and(|exp| exp < now) {
            Self::Expired
        } else if is_approved {
            Self::Live
        } else {
            Self::Pending
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::Pending => "Pending approval",
            Self::Rejected => "Rejected",
            Self::Expired => "Expired",
        }
    }

    /// CSS modifier used by the status badge.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Live => "badge-live",
            Self::Pending => "badge-pending",
            Self::Rejected => "badge-rejected",
            Self::Expired => "badge-expired",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn test_role_from_flags() {
        assert_eq!(Role::from_flags(true, Some(true)), Role::Admin);
        assert_eq!(Role::from_flags(false, Some(false)), Role::Seller);
        assert_eq!(Role::from_flags(false, Some(true)), Role::Customer);
        assert_eq!(Role::from_flags(false, None), Role::Customer);
    }

    #[test]
    fn test_role_roundtrip_str() {
        for role in [Role::Customer, Role::Seller, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_transaction_status_wire_format() {
        let status: TransactionStatus = serde_json::from_str("\"picked_up\"").unwrap();
        assert_eq!(status, TransactionStatus::PickedUp);
        assert_eq!(status.label(), "Picked Up");
        assert!(status.is_open());
        assert!(!TransactionStatus::Returned.is_open());
    }

    #[test]
    fn test_listing_status_precedence() {
        let now = Utc::now();
        let past = Some(now - TimeDelta::days(1));
        let future = Some(now + TimeDelta::days(1));

        assert_eq!(
            ListingStatus::derive(true, true, true, future, now),
            ListingStatus::Rejected
        );
        assert_eq!(
            ListingStatus::derive(true, false, true, past, now),
            ListingStatus::Expired
        );
        assert_eq!(
            ListingStatus::derive(true, false, false, None, now),
            ListingStatus::Expired
        );
        assert_eq!(
            ListingStatus::derive(false, false, true, future, now),
            ListingStatus::Pending
        );
        assert_eq!(
            ListingStatus::derive(true, false, true, None, now),
            ListingStatus::Live
        );
    }
}
