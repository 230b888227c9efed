//! Authentication data models.
//!
//! Wire formats use camelCase field names so that browser clients can read
//! profiles without a translation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User ID type
pub type UserId = Uuid;

/// Postal address attached to a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Chef-specific part of a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChefProfile {
    pub cuisine_specialty: Vec<String>,
    pub bio: Option<String>,
}

/// Profile fields owned by the persistence layer.
///
/// The auth core does not interpret these, it only carries them between the
/// store and the sanitized view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub primary_address: Address,
    pub allergies: Vec<String>,
    pub favorite_cuisine: Vec<String>,
    #[serde(rename = "profilePicURL")]
    pub profile_pic_url: Option<String>,
    pub chef_profile: Option<ChefProfile>,
}

/// Stored user identity, including the password hash.
///
/// Never serialized. Use [`UserRecord::sanitize`] to obtain the form that may
/// leave the server.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub is_chef: bool,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Strip store-internal fields, producing the public view.
    ///
    /// Every path that hands a user to a client goes through here.
    pub fn sanitize(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
            is_chef: self.is_chef,
            created_at: self.created_at,
            profile: self.profile.clone(),
        }
    }
}

/// Sanitized user view, the only user shape sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub email: String,
    pub is_chef: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Validated credentials. Transient, dropped once verification is done.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Input for creating a user in a credential store
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub is_chef: bool,
}

/// Raw login payload.
///
/// Fields are kept as JSON values so that type mismatches can be reported as
/// itemized validation errors instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginPayload {
    pub email: Option<serde_json::Value>,
    pub password: Option<serde_json::Value>,
}

/// Raw registration payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterPayload {
    pub email: Option<serde_json::Value>,
    pub password: Option<serde_json::Value>,
    pub chef: Option<serde_json::Value>,
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdatePayload {
    pub email: Option<serde_json::Value>,
    pub password: Option<serde_json::Value>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub primary_address: Option<Address>,
    pub allergies: Option<Vec<String>>,
    pub favorite_cuisine: Option<Vec<String>>,
}

/// Validated profile update handed to a credential store.
///
/// `password` is plaintext here; stores hash it before persisting.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub primary_address: Option<Address>,
    pub allergies: Option<Vec<String>>,
    pub favorite_cuisine: Option<Vec<String>>,
}

impl ProfileUpdate {
    /// Apply the non-credential fields onto a profile
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(first_name) = &self.first_name {
            profile.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &self.last_name {
            profile.last_name = Some(last_name.clone());
        }
        if let Some(description) = &self.description {
            profile.description = Some(description.clone());
        }
        if let Some(address) = &self.primary_address {
            profile.primary_address = address.clone();
        }
        if let Some(allergies) = &self.allergies {
            profile.allergies = allergies.clone();
        }
        if let Some(cuisine) = &self.favorite_cuisine {
            profile.favorite_cuisine = cuisine.clone();
        }
    }
}

/// Chef registration payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChefProfilePayload {
    pub cuisine_specialty: Vec<String>,
    pub bio: Option<String>,
}

/// JWT claims for a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId, // User ID
    pub email: String,
    pub iat: i64, // Issued at timestamp
    pub exp: i64, // Expiration timestamp
}

/// Identity resolved from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub id: UserId,
    pub email: String,
}

impl From<SessionClaims> for SessionIdentity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
        }
    }
}

/// Freshly minted token together with the sanitized user it was issued for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedSession {
    pub user: PublicUser,
    pub token: String,
}
