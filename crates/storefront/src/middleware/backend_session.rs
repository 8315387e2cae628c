//! Per-user backend cookie jar, loaded from and saved to the session.
//!
//! Handlers that call the backend take a [`BackendCookies`] extractor, pass
//! it to the client as `&mut BackendSession`, and call [`BackendCookies::save`]
//! afterwards so rotated `csrftoken`/`sessionid` values persist.

use std::ops::{Deref, DerefMut};

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use tower_sessions::Session;

use crate::backend::BackendSession;
use crate::models::session_keys;

/// The backend cookies of the current browser session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(State(state): State<AppState>, mut cookies: BackendCookies) -> Result<..> {
///     let result = state.backend().wishlist(&mut cookies).await;
///     cookies.save().await?;
///     let items = result?;
///     // ...
/// }
/// ```
pub struct BackendCookies {
    session: Session,
    loaded: BackendSession,
    current: BackendSession,
}

impl BackendCookies {
    /// Persist the cookies if a backend response changed them.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save(&mut self) -> Result<(), tower_sessions::session::Error> {
        if self.current == self.loaded {
            return Ok(());
        }
        store_backend_session(&self.session, &self.current).await?;
        self.loaded = self.current.clone();
        Ok(())
    }

    /// The storefront session the cookies belong to.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }
}

impl Deref for BackendCookies {
    type Target = BackendSession;

    fn deref(&self) -> &Self::Target {
        &self.current
    }
}

impl DerefMut for BackendCookies {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.current
    }
}

impl<S> FromRequestParts<S> for BackendCookies
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

        let loaded = session
            .get::<BackendSession>(session_keys::BACKEND_SESSION)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to load backend cookies");
                StatusCode::INTERNAL_SERVER_ERROR
            })?
            .unwrap_or_default();

        Ok(Self {
            session,
            current: loaded.clone(),
            loaded,
        })
    }
}

/// Helper to store the backend cookies in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_backend_session(
    session: &Session,
    cookies: &BackendSession,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::BACKEND_SESSION, cookies).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_save_persists_only_changes() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let mut cookies = BackendCookies {
            session: session.clone(),
            loaded: BackendSession::default(),
            current: BackendSession::default(),
        };

        cookies.save().await.unwrap();
        assert!(
            session
                .get::<BackendSession>(session_keys::BACKEND_SESSION)
                .await
                .unwrap()
                .is_none()
        );

        *cookies = BackendSession::with_tokens(Some("tok"), Some("sid"));
        cookies.save().await.unwrap();
        let stored = session
            .get::<BackendSession>(session_keys::BACKEND_SESSION)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.csrf_token(), Some("tok"));
        assert!(stored.has_session());
    }
}
