//! Form validation.
//!
//! Every validator returns [`FieldErrors`]; an empty set means the input is
//! valid. Backend validation failures are parsed into the same shape so
//! pages can render both kinds of error against the same form fields.

mod auth;
mod product;
mod profile;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use auth::{AdminSignUpForm, LoginForm, SignUpForm};
pub use product::{ImageUpload, MAX_IMAGE_BYTES, MAX_PRODUCT_IMAGES, ProductDraft, parse_form_datetime};
pub use profile::ProfileCompletionForm;

/// Key under which errors that belong to no single field are collected.
pub const NON_FIELD: &str = "__all__";

/// Backend keys whose messages are not tied to a form field.
const NON_FIELD_KEYS: [&str; 4] = ["detail", "error", "message", "non_field_errors"];

/// Validation messages keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors holding a single page-level message.
    #[must_use]
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(NON_FIELD, message);
        errors
    }

    /// Record a message for `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one message.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// The message shown for `field`: its first one.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// All messages for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// First page-level message, if any.
    #[must_use]
    pub fn general(&self) -> Option<&str> {
        self.first(NON_FIELD)
    }

    /// Move the messages of `from` onto `to`.
    ///
    /// Used where the backend names a field differently from the form.
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(messages) = self.0.remove(from) {
            self.0.entry(to.to_owned()).or_default().extend(messages);
        }
    }

    /// Append every message of `other`.
    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(())` when empty, otherwise the errors.
    ///
    /// # Errors
    ///
    /// Returns `self` when it holds any message.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Parse a backend error body.
    ///
    /// Accepts `{field: [msg, ...]}`, `{field: "msg"}` and the non-field
    /// forms `{detail | error | message | non_field_errors: ...}`. A bare
    /// string or array becomes a page-level message.
    #[must_use]
    pub fn from_backend(body: &Value) -> Self {
        let mut errors = Self::new();
        match body {
            Value::Object(map) => {
                for (key, value) in map {
                    let field = if NON_FIELD_KEYS.contains(&key.as_str()) {
                        NON_FIELD
                    } else {
                        key.as_str()
                    };
                    for message in messages_of(value) {
                        errors.add(field, message);
                    }
                }
            }
            Value::Null => {}
            other => {
                for message in messages_of(other) {
                    errors.add(NON_FIELD, message);
                }
            }
        }
        errors
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sep = "";
        for (field, messages) in &self.0 {
            for message in messages {
                if field == NON_FIELD {
                    write!(f, "{sep}{message}")?;
                } else {
                    write!(f, "{sep}{field}: {message}")?;
                }
                sep = "; ";
            }
        }
        Ok(())
    }
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(messages_of).collect(),
        Value::Object(map) => map.values().flat_map(messages_of).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// Deserialize an HTML checkbox: present with `on`, `true`, `1` or `yes`.
///
/// # Errors
///
/// Never fails for string or boolean input.
pub fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Bool(b)) => b,
        Some(Raw::Text(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "on" | "true" | "1" | "yes"
        ),
        None => false,
    })
}
