//! HTTP API for the chef marketplace.
//!
//! # Modules
//!
//! - [`auth`]: registration, login, logout and the current-user endpoints
//! - [`chefs`]: chef registration and specialty updates
//! - [`middleware`]: session middleware for protected endpoints
//! - [`request_id`]: request correlation ids and per-request tracing spans
//! - [`error`]: the `{"errors": [..]}` error envelope
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health          - Health check (public)
//! POST /auth/register   - Register and start a session (public)
//! POST /auth/login      - Log in and start a session (public)
//! POST /auth/logout     - Clear the session cookie (public)
//! GET  /auth/user       - Current user plus a fresh token (auth required)
//! PUT  /auth/user       - Partial profile update (auth required)
//! POST /chefs           - Register as a chef (auth required)
//! PUT  /chefs           - Update cuisine specialty (auth required)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use chef_market::auth::{AuthManager, MemoryCredentialStore, PasswordHasher, TokenIssuer};
//! use cm_server::api::{AppState, create_router};
//! use cm_server::config::CookieConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryCredentialStore::new(PasswordHasher::new("pepper".to_string()));
//! let issuer = TokenIssuer::new("a-secret-of-at-least-thirty-two-bytes", chrono::Duration::days(1));
//!
//! let state = AppState {
//!     auth_manager: Arc::new(AuthManager::new(Arc::new(store), issuer)),
//!     cookie: CookieConfig::default(),
//! };
//! let app = create_router(state, None);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! Cross-origin requests are only allowed from a single configured origin, with
//! credentials, so the browser may send the session cookie.

pub mod auth;
pub mod chefs;
pub mod error;
pub mod middleware;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use chef_market::auth::AuthManager;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::CookieConfig;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub cookie: CookieConfig,
}

/// Create the API router with all endpoints and middleware.
///
/// `cors_origin` enables credentialed CORS for exactly that origin. Unparseable
/// origins are logged and ignored.
pub fn create_router(state: AppState, cors_origin: Option<&str>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let protected_routes = Router::new()
        .route(
            "/auth/user",
            get(auth::current_user).put(auth::update_user),
        )
        .route("/chefs", post(chefs::register_chef).put(chefs::update_specialty))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ));

    let router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state);

    match cors_origin.map(cors_layer) {
        Some(Some(cors)) => router.layer(cors),
        _ => router,
    }
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let origin = match HeaderValue::from_str(origin) {
        Ok(origin) => origin,
        Err(e) => {
            tracing::warn!(origin, error = %e, "Ignoring invalid CORS origin");
            return None;
        }
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
    )
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the credential store answers, `503` otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = match state.auth_manager.store().health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Credential store health check failed");
            false
        }
    };

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
