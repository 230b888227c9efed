//! Authentication module providing registration, login, and stateless sessions.
//!
//! This module implements:
//! - Argon2id password hashing with server-side pepper
//! - HS256 JWT session tokens with a configurable lifetime
//! - A credential store trait with PostgreSQL and in-memory backends
//! - Itemized input validation shared by registration and profile updates
//! - A single sanitizer so password hashes never leave the server
//!
//! ## Example
//!
//! ```no_run
//! use chef_market::auth::{AuthManager, PasswordHasher, RegisterPayload, TokenIssuer};
//! use chef_market::db::{Database, DatabaseConfig, PgCredentialStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::from_env()).await?;
//!     let store = PgCredentialStore::new(
//!         db.pool().clone(),
//!         PasswordHasher::new("secret_pepper".to_string()),
//!     );
//!     let auth = AuthManager::new(
//!         Arc::new(store),
//!         TokenIssuer::new("jwt_secret", chrono::Duration::days(1)),
//!     );
//!
//!     let payload: RegisterPayload = serde_json::from_str(
//!         r#"{"email": "cook@example.com", "password": "secret1"}"#,
//!     )?;
//!     let session = auth.register(payload).await?;
//!     println!("Registered user: {}", session.user.email);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod password;
pub mod store;
pub mod token;
pub mod validation;

pub use errors::{AuthError, AuthResult, ErrorKind, StoreError, StoreResult, TokenError};
pub use manager::AuthManager;
pub use models::{
    Address, ChefProfile, ChefProfilePayload, Credentials, IssuedSession, LoginPayload, NewUser,
    Profile, ProfileUpdate, ProfileUpdatePayload, PublicUser, RegisterPayload, SessionClaims,
    SessionIdentity, UserId, UserRecord,
};
pub use password::PasswordHasher;
pub use store::{CredentialStore, MemoryCredentialStore};
pub use token::TokenIssuer;
