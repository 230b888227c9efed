//! Argon2id password hashing with a server-side pepper.

use super::errors::{StoreError, StoreResult};
use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

/// Well-formed hash that no password matches, verified against when a login
/// names an unknown email
pub(crate) const DECOY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$Y2hlZi1tYXJrZXQtc2FsdA$AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

/// One-way salted password hasher shared by every credential store
#[derive(Clone)]
pub struct PasswordHasher {
    pepper: String,
}

impl PasswordHasher {
    /// Create a hasher that appends `pepper` to every plaintext before hashing
    pub fn new(pepper: String) -> Self {
        Self { pepper }
    }

    /// Hash a plaintext password into a PHC string with a fresh random salt
    pub fn hash(&self, password: &str) -> StoreResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);

        Ok(Argon2::default()
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| StoreError::Hashing)?
            .to_string())
    }

    /// Verify a plaintext password against a stored PHC string.
    ///
    /// An unparseable hash is reported as a store error, a mismatch as `false`.
    pub fn verify(&self, password: &str, hash: &str) -> StoreResult<bool> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| StoreError::Hashing)?;

        Ok(Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}
