//! Input validation for credentials and profile updates.
//!
//! Validators collect every problem they find rather than stopping at the
//! first, so clients can show all messages at once.

use super::{
    errors::{AuthError, AuthResult},
    models::{Credentials, LoginPayload, ProfileUpdate, ProfileUpdatePayload, RegisterPayload},
};
use serde_json::Value;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

const MAX_EMAIL_LENGTH: usize = 254;

const WEAK_PASSWORD_MESSAGE: &str = "Password should be at least 6 characters long";

/// Check that an email address is plausibly deliverable.
///
/// Accepts `local@domain.tld` where the local part is non-empty, the domain
/// has at least two non-empty dot separated labels, and there is no
/// whitespace anywhere.
pub fn is_valid_email_format(email: &str) -> bool {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return false;
    }
    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 || domain.contains('@') {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    })
}

/// Canonical form used for lookups and persistence
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate the shape of a login request
pub fn validate_login(payload: &LoginPayload) -> AuthResult<Credentials> {
    validate_shape(payload.email.as_ref(), payload.password.as_ref())
}

/// Validate a registration request, returning the credentials and chef flag.
///
/// Applies the login shape checks plus the minimum password length.
pub fn validate_registration(payload: &RegisterPayload) -> AuthResult<(Credentials, bool)> {
    let credentials = validate_shape(payload.email.as_ref(), payload.password.as_ref())?;
    if credentials.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(vec![WEAK_PASSWORD_MESSAGE.to_string()]));
    }
    Ok((credentials, is_truthy(payload.chef.as_ref())))
}

/// Validate a partial profile update.
///
/// Email and password are only checked when present, using the same rules as
/// registration. Falsy values (`null`, `""`, `false`, `0`) count as absent.
pub fn validate_profile_update(payload: &ProfileUpdatePayload) -> AuthResult<ProfileUpdate> {
    let mut errors = Vec::new();

    let email = match payload.email.as_ref() {
        value if !is_truthy(value) => None,
        Some(Value::String(email)) if is_valid_email_format(email.trim()) => {
            Some(normalize_email(email))
        }
        Some(_) => {
            errors.push("Invalid email".to_string());
            None
        }
        None => None,
    };

    let password = match payload.password.as_ref() {
        value if !is_truthy(value) => None,
        Some(Value::String(password)) if password.chars().count() >= MIN_PASSWORD_LENGTH => {
            Some(password.clone())
        }
        Some(Value::String(_)) => {
            errors.push(WEAK_PASSWORD_MESSAGE.to_string());
            None
        }
        Some(_) => {
            errors.push("Invalid type for password".to_string());
            None
        }
        None => None,
    };

    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    Ok(ProfileUpdate {
        email,
        password,
        first_name: payload.first_name.clone(),
        last_name: payload.last_name.clone(),
        description: payload.description.clone(),
        primary_address: payload.primary_address.clone(),
        allergies: payload.allergies.clone(),
        favorite_cuisine: payload.favorite_cuisine.clone(),
    })
}

fn validate_shape(email: Option<&Value>, password: Option<&Value>) -> AuthResult<Credentials> {
    let mut errors = Vec::new();

    if is_blank(email) {
        errors.push("Missing email".to_string());
    }
    if !is_truthy(password) {
        errors.push("Missing password".to_string());
    }

    let email = match email {
        Some(Value::String(email)) if !email.trim().is_empty() => {
            if !is_valid_email_format(email.trim()) {
                errors.push("Invalid format for email".to_string());
            }
            Some(normalize_email(email))
        }
        Some(value) if !is_blank(Some(value)) => {
            errors.push("Invalid type for email".to_string());
            None
        }
        _ => None,
    };

    let password = match password {
        Some(Value::String(password)) if !password.is_empty() => Some(password.clone()),
        Some(value) if is_truthy(Some(value)) => {
            errors.push("Invalid type for password".to_string());
            None
        }
        _ => None,
    };

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok(Credentials { email, password }),
        _ => Err(AuthError::Validation(errors)),
    }
}

/// Falsy, or a string of whitespace only. Used for the email field.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Bool(b)) => !b,
        _ => false,
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
