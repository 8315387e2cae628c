//! Sign-up, login and superuser bootstrap forms.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{FieldErrors, checkbox};
use crate::Role;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Invalid regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MIN_ADMIN_PASSWORD_LENGTH: usize = 6;

/// Account registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub agree_terms: bool,
    #[serde(default)]
    pub role: Role,
}

impl SignUpForm {
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            errors.add("full_name", "Full name is required");
        } else if full_name.chars().count() < 2 {
            errors.add("full_name", "Please enter your full name");
        }

        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", "Username is required");
        } else if username.chars().count() < MIN_USERNAME_LENGTH {
            errors.add("username", "Username must be at least 3 characters long");
        } else if !USERNAME_RE.is_match(username) {
            errors.add(
                "username",
                "Username can only contain letters, numbers, and underscores",
            );
        }

        validate_email(&self.email, &mut errors);

        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add("password", "Password must be at least 8 characters long");
        } else if !is_mixed_password(&self.password) {
            errors.add(
                "password",
                "Password must contain uppercase, lowercase, and number",
            );
        }

        if self.confirm_password.is_empty() {
            errors.add("confirm_password", "Please confirm your password");
        } else if self.confirm_password != self.password {
            errors.add("confirm_password", "Passwords do not match");
        }

        if !self.agree_terms {
            errors.add("agree_terms", "You must agree to the terms and conditions");
        }

        if self.role == Role::Admin {
            errors.add("role", "Choose customer or seller");
        }

        errors
    }
}

/// Username/password login form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.add("username", "Username is required");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors
    }
}

/// Superuser bootstrap form. Guarded by a shared secret on the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminSignUpForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub secret_key: String,
}

impl AdminSignUpForm {
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        validate_email(&self.email, &mut errors);

        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", "Username is required");
        } else if username.chars().count() < MIN_USERNAME_LENGTH {
            errors.add("username", "Username must be at least 3 characters long");
        }

        if self.name.trim().is_empty() {
            errors.add("name", "Full name is required");
        }

        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if self.password.chars().count() < MIN_ADMIN_PASSWORD_LENGTH {
            errors.add("password", "Password must be at least 6 characters long");
        }

        if self.secret_key.trim().is_empty() {
            errors.add("secret_key", "Secret key is required");
        }

        errors
    }
}

fn validate_email(email: &str, errors: &mut FieldErrors) {
    let email = email.trim();
    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !EMAIL_RE.is_match(email) {
        errors.add("email", "Please enter a valid email address");
    }
}

fn is_mixed_password(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}
