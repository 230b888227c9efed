//! PostgreSQL implementation of the credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use crate::auth::{
    ChefProfile, CredentialStore, NewUser, PasswordHasher, Profile, ProfileUpdate, StoreError,
    StoreResult, UserId, UserRecord,
};

const UNIQUE_VIOLATION: &str = "23505";

/// `CredentialStore` backed by the `users` table
pub struct PgCredentialStore {
    pool: PgPool,
    hasher: PasswordHasher,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool, hasher: PasswordHasher) -> Self {
        Self { pool, hasher }
    }
}

fn user_from_row(row: &PgRow) -> StoreResult<UserRecord> {
    let profile: Json<Profile> = row.try_get("profile")?;
    Ok(UserRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        is_chef: row.try_get("is_chef")?,
        profile: profile.0,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

/// Translate a unique-index violation on email into `DuplicateEmail`
fn map_write_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::DuplicateEmail
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, is_chef, profile, created_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, is_chef, profile, created_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn create(&self, user: NewUser) -> StoreResult<UserRecord> {
        let password_hash = self.hasher.hash(&user.password)?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, is_chef, profile)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, password_hash, is_chef, profile, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&password_hash)
        .bind(user.is_chef)
        .bind(Json(Profile::default()))
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        let record = user_from_row(&row)?;
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

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT id, email, password_hash, is_chef, profile, created_at
             FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut user = user_from_row(&row)?;

        if let Some(email) = update.email.clone() {
            user.email = email;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        update.apply_to(&mut user.profile);

        let row = sqlx::query(
            r#"
            UPDATE users SET email = $2, password_hash = $3, profile = $4
            WHERE id = $1
            RETURNING id, email, password_hash, is_chef, profile, created_at
            "#,
        )
        .bind(id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(Json(&user.profile))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await?;
        log::debug!("Updated profile of user {}", id);

        user_from_row(&row).map(Some)
    }

    async fn set_chef_profile(
        &self,
        id: UserId,
        chef_profile: ChefProfile,
    ) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET is_chef = TRUE,
                profile = jsonb_set(profile, '{chefProfile}', $2::jsonb, true)
            WHERE id = $1
            RETURNING id, email, password_hash, is_chef, profile, created_at
            "#,
        )
        .bind(id)
        .bind(Json(&chef_profile))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
