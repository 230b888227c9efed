//! Session middleware for protected endpoints.
//!
//! The token is read from the `token` cookie, falling back to an
//! `Authorization: Bearer` header. A verified identity is injected into the
//! request extensions for downstream handlers.
//!
//! # Extracting the Identity
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use chef_market::auth::SessionIdentity;
//!
//! async fn protected_handler(Extension(identity): Extension<SessionIdentity>) -> String {
//!     format!("Authenticated as {}", identity.email)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use chef_market::auth::{AuthError, TokenError};

use super::{AppState, auth::TOKEN_COOKIE, error::ApiError};
use crate::logging::{SecurityEvent, log_security_event};
use crate::metrics;

/// Validate the session token and inject the caller's identity.
///
/// # Behavior
///
/// - **Valid token**: inserts `SessionIdentity` and calls the next handler
/// - **Missing, expired or tampered token**: `401` with `"Please sign in"`
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = session_token(&jar, request.headers()) else {
        metrics::session_rejections_total("missing");
        return Err(ApiError::Unauthenticated);
    };

    match state.auth_manager.verify_token(&token) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(err) => {
            let reason = rejection_reason(&err);
            metrics::session_rejections_total(reason);
            if reason != "expired" {
                log_security_event(SecurityEvent::RejectedSession, None, reason);
            }
            Err(ApiError::Unauthenticated)
        }
    }
}

/// Cookie first, then bearer header. Empty values count as absent.
fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    jar.get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
        })
}

fn rejection_reason(err: &AuthError) -> &'static str {
    match err {
        AuthError::InvalidSession(TokenError::Expired) => "expired",
        AuthError::InvalidSession(TokenError::BadSignature) => "bad_signature",
        _ => "malformed",
    }
}
