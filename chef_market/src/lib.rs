//! # Chef Market
//!
//! Credential verification and session issuance for the chef marketplace.
//!
//! Sessions are stateless: a successful login, registration or session check
//! mints a signed, time-limited token that encodes the caller's email and id.
//! Nothing is kept server-side, so any process holding the signing secret can
//! verify a request independently.
//!
//! ## Core Modules
//!
//! - [`auth`]: credential store adapter, token issuer, input validation and the
//!   [`AuthManager`](auth::AuthManager) that ties them together
//! - [`db`]: PostgreSQL connection pooling and schema setup
//!
//! ## Example
//!
//! ```
//! use chef_market::auth::{AuthManager, MemoryCredentialStore, PasswordHasher, TokenIssuer};
//! use std::sync::Arc;
//!
//! let store = MemoryCredentialStore::new(PasswordHasher::new("pepper".to_string()));
//! let issuer = TokenIssuer::new("a-very-long-secret-used-only-in-docs", chrono::Duration::hours(1));
//! let auth = AuthManager::new(Arc::new(store), issuer);
//! # let _ = auth;
//! ```

/// Registration, login, session tokens and profile updates.
pub mod auth;

/// Database connection pool and schema.
pub mod db;

pub use auth::{AuthError, AuthManager, AuthResult, PublicUser, UserId};
