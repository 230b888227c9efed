//! Credential store adapter.
//!
//! The auth core only needs lookup by email or id, password verification,
//! creation and per-record updates. [`CredentialStore`] captures that, with a
//! PostgreSQL implementation in [`crate::db`] and an in-memory one here.

use super::{
    errors::{StoreError, StoreResult},
    models::{ChefProfile, NewUser, Profile, ProfileUpdate, UserId, UserRecord},
    password::PasswordHasher,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Persistence operations consumed by the auth core
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find user by (normalized) email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>>;

    /// Hash the password and persist a new user
    async fn create(&self, user: NewUser) -> StoreResult<UserRecord>;

    /// Compare a plaintext password with the user's stored hash
    async fn verify_password(&self, user: &UserRecord, password: &str) -> StoreResult<bool>;

    /// Apply a partial update. Returns `None` if the user does not exist.
    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> StoreResult<Option<UserRecord>>;

    /// Mark the user as a chef and replace their chef profile
    async fn set_chef_profile(
        &self,
        id: UserId,
        chef_profile: ChefProfile,
    ) -> StoreResult<Option<UserRecord>>;

    /// Check that the backing store is reachable
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// In-memory credential store.
///
/// Suitable for tests and single-process development servers. All writes for
/// one record happen under a single write lock.
#[derive(Debug)]
pub struct MemoryCredentialStore {
    hasher: PasswordHasher,
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl MemoryCredentialStore {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self {
            hasher,
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Whether the store has no users
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Remove a user, returning whether it existed
    pub async fn remove(&self, id: UserId) -> bool {
        self.users.write().await.remove(&id).is_some()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> StoreResult<UserRecord> {
        // Hash outside the lock, Argon2 is deliberately slow
        let password_hash = self.hasher.hash(&user.password)?;

        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash,
            is_chef: user.is_chef,
            profile: Profile::default(),
            created_at: Utc::now(),
        };
        users.insert(record.id, record.clone());
        log::debug!("Created user {}", record.id);

        Ok(record)
    }

    async fn verify_password(&self, user: &UserRecord, password: &str) -> StoreResult<bool> {
        self.hasher.verify(password, &user.password_hash)
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> StoreResult<Option<UserRecord>> {
        let password_hash = match &update.password {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };

        let mut users = self.users.write().await;
        if let Some(email) = &update.email {
            if users.values().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::DuplicateEmail);
            }
        }

        let Some(record) = users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = update.email.clone() {
            record.email = email;
        }
        if let Some(hash) = password_hash {
            record.password_hash = hash;
        }
        update.apply_to(&mut record.profile);

        Ok(Some(record.clone()))
    }

    async fn set_chef_profile(
        &self,
        id: UserId,
        chef_profile: ChefProfile,
    ) -> StoreResult<Option<UserRecord>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|record| {
            record.is_chef = true;
            record.profile.chef_profile = Some(chef_profile);
            record.clone()
        }))
    }
}
