//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{
        ChefProfile, ChefProfilePayload, IssuedSession, LoginPayload, NewUser, Profile,
        ProfileUpdatePayload, PublicUser, RegisterPayload, SessionIdentity, UserId, UserRecord,
    },
    password::DECOY_HASH,
    store::CredentialStore,
    token::TokenIssuer,
    validation::{validate_login, validate_profile_update, validate_registration},
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Authentication manager.
///
/// Orchestrates a [`CredentialStore`] and a [`TokenIssuer`] for registration,
/// login, session checks and profile updates. Holds no per-session state.
#[derive(Clone)]
pub struct AuthManager {
    store: Arc<dyn CredentialStore>,
    issuer: TokenIssuer,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `store` - Credential store adapter
    /// * `issuer` - Session token issuer
    pub fn new(store: Arc<dyn CredentialStore>, issuer: TokenIssuer) -> Self {
        Self { store, issuer }
    }

    /// Access the underlying credential store
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Access the token issuer
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Register a new user and issue a session for it
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Missing or malformed email/password
    /// * `AuthError::EmailTaken` - Email already registered
    /// * `AuthError::Store` - Persistence or hashing failure
    pub async fn register(&self, payload: RegisterPayload) -> AuthResult<IssuedSession> {
        let (credentials, is_chef) = validate_registration(&payload)?;

        if self.store.find_by_email(&credentials.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let user = self
            .store
            .create(NewUser {
                email: credentials.email,
                password: credentials.password,
                is_chef,
            })
            .await?;

        self.issuer.issue(&user)
    }

    /// Verify credentials and issue a session
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Missing or malformed email/password
    /// * `AuthError::InvalidCredentials` - Unknown email or wrong password,
    ///   deliberately indistinguishable
    pub async fn login(&self, payload: LoginPayload) -> AuthResult<IssuedSession> {
        let credentials = validate_login(&payload)?;

        let Some(user) = self.store.find_by_email(&credentials.email).await? else {
            // Pay the same hashing cost as a wrong password
            let _ = self
                .store
                .verify_password(&decoy_user(), &credentials.password)
                .await;
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .store
            .verify_password(&user, &credentials.password)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        self.issuer.issue(&user)
    }

    /// Verify a session token and resolve the caller's identity
    pub fn verify_token(&self, token: &str) -> AuthResult<SessionIdentity> {
        Ok(self.issuer.verify(token)?.into())
    }

    /// Re-fetch the user behind a verified session and issue a fresh token
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - The account no longer exists
    pub async fn current_session(&self, id: UserId) -> AuthResult<IssuedSession> {
        let user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.issuer.issue(&user)
    }

    /// Apply a partial profile update for the authenticated user
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Invalid email or too short password
    /// * `AuthError::EmailTaken` - New email belongs to another account
    /// * `AuthError::UserNotFound` - The account no longer exists
    pub async fn update_profile(
        &self,
        id: UserId,
        payload: ProfileUpdatePayload,
    ) -> AuthResult<PublicUser> {
        let update = validate_profile_update(&payload)?;

        self.store
            .update_profile(id, update)
            .await?
            .map(|user| user.sanitize())
            .ok_or(AuthError::UserNotFound)
    }

    /// Mark the authenticated user as a chef with the given profile
    pub async fn register_chef(
        &self,
        id: UserId,
        payload: ChefProfilePayload,
    ) -> AuthResult<PublicUser> {
        let chef_profile = ChefProfile {
            cuisine_specialty: clean_list(payload.cuisine_specialty),
            bio: payload.bio.filter(|bio| !bio.trim().is_empty()),
        };

        self.store
            .set_chef_profile(id, chef_profile)
            .await?
            .map(|user| user.sanitize())
            .ok_or(AuthError::UserNotFound)
    }

    /// Replace the cuisine specialty of an existing chef profile
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - The user is not registered as a chef
    pub async fn update_chef_specialty(
        &self,
        id: UserId,
        cuisine_specialty: Vec<String>,
    ) -> AuthResult<PublicUser> {
        let user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let Some(mut chef_profile) = user.profile.chef_profile.filter(|_| user.is_chef) else {
            return Err(AuthError::Validation(vec![
                "User is not registered as a chef".to_string(),
            ]));
        };
        chef_profile.cuisine_specialty = clean_list(cuisine_specialty);

        self.store
            .set_chef_profile(id, chef_profile)
            .await?
            .map(|user| user.sanitize())
            .ok_or(AuthError::UserNotFound)
    }
}

/// Trim entries and drop empty ones and duplicates, keeping order
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !cleaned.iter().any(|c| c == item) {
            cleaned.push(item.to_string());
        }
    }
    cleaned
}

/// Account that exists only to be verified against
fn decoy_user() -> UserRecord {
    UserRecord {
        id: Uuid::nil(),
        email: String::new(),
        password_hash: DECOY_HASH.to_string(),
        is_chef: false,
        profile: Profile::default(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_list() {
        let items = vec![
            " Thai ".to_string(),
            "".to_string(),
            "Thai".to_string(),
            "Italian".to_string(),
        ];
        assert_eq!(clean_list(items), vec!["Thai".to_string(), "Italian".to_string()]);
    }
}
