//! Backend cookies held on behalf of one browser session.

use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::{Deserialize, Serialize};
use tower_sessions::cookie::Cookie;

/// Django's CSRF cookie.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Django's session cookie.
pub const SESSION_COOKIE: &str = "sessionid";

/// The backend's `csrftoken` and `sessionid` cookies for one user.
///
/// Stored in the storefront session; implements `Debug` manually to redact
/// the session id.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSession {
    csrf_token: Option<String>,
    session_id: Option<String>,
}

impl std::fmt::Debug for BackendSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSession")
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "[REDACTED]"))
            .field("session_id", &self.session_id.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl BackendSession {
    #[must_use]
    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Whether the backend has issued a session cookie.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.session_id.is_some()
    }

    /// `Cookie` request header carrying the held cookies.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        let pairs: Vec<String> = [
            (CSRF_COOKIE, &self.csrf_token),
            (SESSION_COOKIE, &self.session_id),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}={v}")))
        .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    /// Apply every `Set-Cookie` in a backend response.
    ///
    /// Deletions (empty value or `Max-Age=0`) clear the cookie. Returns
    /// whether anything changed.
    pub fn absorb(&mut self, headers: &HeaderMap) -> bool {
        let before = self.clone();
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            let Ok(cookie) = Cookie::parse(raw) else {
                tracing::debug!("Ignoring unparseable Set-Cookie from backend");
                continue;
            };

            let slot = match cookie.name() {
                CSRF_COOKIE => &mut self.csrf_token,
                SESSION_COOKIE => &mut self.session_id,
                _ => continue,
            };

            let value = cookie.value().trim_matches('"');
            let deleted = value.is_empty()
                || cookie
                    .max_age()
                    .is_some_and(|age| age <= tower_sessions::cookie::time::Duration::ZERO);
            *slot = if deleted { None } else { Some(value.to_owned()) };
        }
        *self != before
    }

    /// Forget the backend session, keeping the CSRF token.
    pub fn end_session(&mut self) {
        self.session_id = None;
    }

    #[cfg(test)]
    pub(crate) fn with_tokens(csrf: Option<&str>, session: Option<&str>) -> Self {
        Self {
            csrf_token: csrf.map(str::to_owned),
            session_id: session.map(str::to_owned),
        }
    }
}
