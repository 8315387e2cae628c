//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Adds restrictive security headers to all responses. The CSP is locked
//! down to the storefront itself plus the two third parties a page needs:
//! Razorpay's checkout (script, frames, API calls) and listing images served
//! by the backend or an https CDN.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;
use crate::state::AppState;

const RAZORPAY_CHECKOUT: &str = "https://checkout.razorpay.com";
const RAZORPAY_API: &str = "https://api.razorpay.com";

/// Build the Content-Security-Policy for one response.
///
/// `image_origin` is the backend origin (uploaded listing images);
/// `upgrade` adds `upgrade-insecure-requests` for https deployments.
#[must_use]
pub fn content_security_policy(nonce: Option<&str>, image_origin: &str, upgrade: bool) -> String {
    let nonce_src = nonce
        .filter(|n| !n.is_empty())
        .map(|n| format!(" 'nonce-{n}'"))
        .unwrap_or_default();

    let mut policy = format!(
        "default-src 'none'; \
         script-src 'self'{nonce_src} {RAZORPAY_CHECKOUT}; \
         style-src 'self' 'unsafe-inline'; \
         font-src 'self'; \
         img-src 'self' data: https: {image_origin}; \
         connect-src 'self' {RAZORPAY_API} https://lumberjack.razorpay.com; \
         frame-src {RAZORPAY_API} {RAZORPAY_CHECKOUT}; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    );
    if upgrade {
        policy.push_str("; upgrade-insecure-requests");
    }
    policy
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `Referrer-Policy: same-origin` - No referrer leakage to third parties
/// - `Content-Security-Policy` - See [`content_security_policy`]
/// - `Permissions-Policy` - Deny sensitive features, allow payment for Razorpay
/// - `Cache-Control: no-store, max-age=0` - Pages are per-user
/// - `Cross-Origin-Opener-Policy: same-origin-allow-popups` - Razorpay may open popups
/// - `X-DNS-Prefetch-Control: off` - Prevent DNS prefetch leakage
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let nonce = response
        .extensions()
        .get::<CspNonce>()
        .map(|n| n.value().to_owned());
    let backend = state.backend().base_url();
    let image_origin = backend.origin().ascii_serialization();
    let policy = content_security_policy(
        nonce.as_deref(),
        &image_origin,
        state.config().is_https(),
    );

    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("same-origin"));

    match HeaderValue::from_str(&policy) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => tracing::error!(error = %e, "Invalid CSP header value"),
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             camera=(), \
             display-capture=(), \
             geolocation=(), \
             gyroscope=(), \
             magnetometer=(), \
             microphone=(), \
             payment=(self \"https://api.razorpay.com\"), \
             usb=(), \
             xr-spatial-tracking=()",
        ),
    );

    headers.insert(
        HeaderName::from_static("cache-control"),
        HeaderValue::from_static("no-store, max-age=0"),
    );

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin-allow-popups"),
    );

    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_includes_nonce_and_razorpay() {
        let policy = content_security_policy(Some("abc=="), "http://localhost:8000", false);
        assert!(policy.contains("script-src 'self' 'nonce-abc==' https://checkout.razorpay.com"));
        assert!(policy.contains("img-src 'self' data: https: http://localhost:8000"));
        assert!(policy.contains("frame-src https://api.razorpay.com"));
        assert!(!policy.contains("upgrade-insecure-requests"));
    }

    #[test]
    fn test_policy_without_nonce() {
        let policy = content_security_policy(None, "https://api.rentalhub.com", true);
        assert!(!policy.contains("nonce-"));
        assert!(policy.ends_with("upgrade-insecure-requests"));
    }
}
