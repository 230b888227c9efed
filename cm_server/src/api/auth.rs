//! Authentication API handlers.
//!
//! Successful registration, login and session checks set the session token as
//! an `HttpOnly` cookie and also return it in the body for non-browser clients.
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -i -X POST http://localhost:3001/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "cook@example.com", "password": "secret1"}'
//! ```
//!
//! Check the current session with the returned cookie:
//! ```bash
//! curl -i http://localhost:3001/auth/user --cookie "token=eyJhbGciOiJIUzI1NiIs..."
//! ```

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderName, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use chef_market::auth::{
    AuthError, IssuedSession, LoginPayload, ProfileUpdatePayload, PublicUser, RegisterPayload,
    SessionIdentity,
};
use serde::{Deserialize, Serialize};

use super::{AppState, error::ApiError};
use crate::config::CookieConfig;
use crate::logging::{SecurityEvent, log_security_event};
use crate::metrics;

/// Name of the session cookie
pub const TOKEN_COOKIE: &str = "token";

/// Body of endpoints that return a single user
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, config: &CookieConfig, max_age_secs: i64) -> String {
    format!(
        "{TOKEN_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}{}",
        secure_attr(config)
    )
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(config: &CookieConfig) -> String {
    format!(
        "{TOKEN_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{}",
        secure_attr(config)
    )
}

fn secure_attr(config: &CookieConfig) -> &'static str {
    if config.secure { "; Secure" } else { "" }
}

fn cookie_for(state: &AppState, session: &IssuedSession) -> [(HeaderName, String); 1] {
    let max_age = state.auth_manager.issuer().ttl().num_seconds();
    [(
        SET_COOKIE,
        session_cookie(&session.token, &state.cookie, max_age),
    )]
}

/// Email as submitted, for security logs only
fn submitted_email(value: Option<&serde_json::Value>) -> Option<String> {
    value.and_then(|v| v.as_str()).map(|s| s.trim().to_lowercase())
}

/// Register a new user and start a session.
///
/// # Request Body
///
/// ```json
/// { "email": "cook@example.com", "password": "secret1", "chef": false }
/// ```
///
/// # Response
///
/// `201 Created` with `{"user": {..}, "token": ".."}` and the session cookie.
///
/// # Errors
///
/// - `400 Bad Request`: validation errors or an already registered email
/// - `500 Internal Server Error`: store or hashing failure
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterPayload>, JsonRejection>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<IssuedSession>), ApiError> {
    let Json(payload) = payload?;
    let email = submitted_email(payload.email.as_ref());

    match state.auth_manager.register(payload).await {
        Ok(session) => {
            metrics::registrations_total(true);
            tracing::info!(user_id = %session.user.id, "User registered");
            Ok((StatusCode::CREATED, cookie_for(&state, &session), Json(session)))
        }
        Err(err) => {
            metrics::registrations_total(false);
            if matches!(err, AuthError::EmailTaken) {
                log_security_event(
                    SecurityEvent::DuplicateRegistration,
                    email.as_deref(),
                    "Registration for an existing email",
                );
            }
            Err(err.into())
        }
    }
}

/// Verify credentials and start a session.
///
/// # Response
///
/// `200 OK` with `{"user": {..}, "token": ".."}` and the session cookie.
///
/// # Errors
///
/// - `400 Bad Request`: validation errors, or `"Email or password invalid"`
///   for both unknown emails and wrong passwords
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<([(HeaderName, String); 1], Json<IssuedSession>), ApiError> {
    let Json(payload) = payload?;
    let email = submitted_email(payload.email.as_ref());

    match state.auth_manager.login(payload).await {
        Ok(session) => {
            metrics::login_attempts_total(true);
            tracing::info!(user_id = %session.user.id, "User logged in");
            Ok((cookie_for(&state, &session), Json(session)))
        }
        Err(err) => {
            metrics::login_attempts_total(false);
            if matches!(err, AuthError::InvalidCredentials) {
                log_security_event(
                    SecurityEvent::FailedLogin,
                    email.as_deref(),
                    "Invalid credentials",
                );
            }
            Err(err.into())
        }
    }
}

/// Clear the session cookie.
///
/// Sessions are stateless, so a copied token stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, clear_session_cookie(&state.cookie))],
    )
}

/// Return the current user and a freshly issued token.
///
/// A verified token whose account no longer exists gets `400` with
/// `"Please sign in"` and a cleared cookie.
pub async fn current_user(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> Response {
    match state.auth_manager.current_session(identity.id).await {
        Ok(session) => (cookie_for(&state, &session), Json(session)).into_response(),
        Err(AuthError::UserNotFound) => {
            log_security_event(
                SecurityEvent::StaleSession,
                Some(&identity.email),
                "Valid token for a missing account",
            );
            (
                [(SET_COOKIE, clear_session_cookie(&state.cookie))],
                ApiError::from(AuthError::UserNotFound),
            )
                .into_response()
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Apply a partial profile update for the current user.
///
/// # Request Body
///
/// Any subset of `email`, `password`, `firstName`, `lastName`, `description`,
/// `primaryAddress`, `allergies` and `favoriteCuisine`.
///
/// # Response
///
/// `200 OK` with the updated user, not wrapped in an envelope.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    payload: Result<Json<ProfileUpdatePayload>, JsonRejection>,
) -> Result<Json<PublicUser>, ApiError> {
    let Json(payload) = payload?;

    let user = state
        .auth_manager
        .update_profile(identity.id, payload)
        .await?;
    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(Json(user))
}
