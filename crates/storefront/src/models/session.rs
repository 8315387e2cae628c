//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use rentalhub_core::{Role, UserId};

use crate::backend::User;

/// Session-stored user identity.
///
/// A snapshot of the backend user taken at login; the backend session
/// cookie stays the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Profile completion is still outstanding.
    pub needs_profile: bool,
}

impl CurrentUser {
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }

    #[must_use]
    pub const fn is_seller(&self) -> bool {
        self.role.can_sell()
    }

    /// Where to send the user after signing in.
    #[must_use]
    pub const fn home_path(&self) -> &'static str {
        if self.needs_profile {
            "/profile/complete"
        } else if self.role.can_sell() {
            "/seller"
        } else {
            "/products"
        }
    }
}

impl CurrentUser {
    /// Snapshot a backend user.
    ///
    /// Backends that do not report `is_customer` leave the role to
    /// `role_hint`, the role the user picked in this browser session.
    #[must_use]
    pub fn from_backend(user: &User, role_hint: Option<Role>) -> Self {
        let role = if user.is_superuser || user.is_customer.is_some() {
            user.role()
        } else {
            role_hint.unwrap_or_default()
        };

        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role,
            needs_profile: user.needs_profile(),
        }
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self::from_backend(user, None)
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the backend's `csrftoken`/`sessionid` cookies.
    pub const BACKEND_SESSION: &str = "backend_session";

    /// Key for the role picked at sign-up or profile completion.
    pub const ROLE_HINT: &str = "role_hint";

    /// Key for the order awaiting payment verification.
    pub const PENDING_ORDER: &str = "pending_order";
}
