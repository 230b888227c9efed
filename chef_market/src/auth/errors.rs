//! Authentication error types.

use thiserror::Error;

/// Generic message for failures whose detail must stay server-side
pub const INTERNAL_ERROR_MESSAGE: &str = "Unexpected error occurred";

/// Message for both unknown email and wrong password
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Email or password invalid";

/// Message returned when a session cannot be resolved
pub const SIGN_IN_MESSAGE: &str = "Please sign in";

/// Credential store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    Hashing,

    /// Email already belongs to another account
    #[error("Email already exists")]
    DuplicateEmail,
}

/// Result type for credential store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Session token errors
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token signature does not match its payload
    #[error("Token signature mismatch")]
    BadSignature,

    /// Token is past its expiry
    #[error("Token expired")]
    Expired,

    /// Token could not be decoded
    #[error("Malformed token")]
    Malformed,

    /// Token could not be signed
    #[error("Token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Issue time plus lifetime is not a representable timestamp
    #[error("Token expiry out of range")]
    ExpiryOutOfRange,
}

/// Client-facing category of an [`AuthError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input
    Validation,
    /// Bad credentials, or a missing, invalid or expired session
    Authentication,
    /// Duplicate registration
    Conflict,
    /// Store or signing failure
    Internal,
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input failed validation, one message per problem
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Unknown email or wrong password
    #[error("Email or password invalid")]
    InvalidCredentials,

    /// Email already registered
    #[error("User with given email already exists")]
    EmailTaken,

    /// Token missing, invalid or expired
    #[error("Invalid session: {0}")]
    InvalidSession(#[from] TokenError),

    /// Session resolved to an account that no longer exists
    #[error("User not found")]
    UserNotFound,

    /// Credential store error
    #[error("Store error: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AuthError::EmailTaken,
            other => AuthError::Store(other),
        }
    }
}

impl AuthError {
    /// Category used by transports to pick a status code
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::InvalidCredentials | AuthError::UserNotFound => ErrorKind::Authentication,
            AuthError::InvalidSession(TokenError::Signing(_) | TokenError::ExpiryOutOfRange) => {
                ErrorKind::Internal
            }
            AuthError::InvalidSession(_) => ErrorKind::Authentication,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::Store(_) => ErrorKind::Internal,
        }
    }

    /// Messages that are safe to show a client.
    ///
    /// Store and signing failures collapse into a single generic message, and
    /// token failures never reveal which check failed.
    pub fn client_messages(&self) -> Vec<String> {
        match self {
            AuthError::Validation(errors) => errors.clone(),
            AuthError::InvalidCredentials => vec![INVALID_CREDENTIALS_MESSAGE.to_string()],
            AuthError::EmailTaken => vec![self.to_string()],
            AuthError::UserNotFound => vec![SIGN_IN_MESSAGE.to_string()],
            AuthError::InvalidSession(TokenError::Signing(_) | TokenError::ExpiryOutOfRange)
            | AuthError::Store(_) => {
                vec![INTERNAL_ERROR_MESSAGE.to_string()]
            }
            AuthError::InvalidSession(_) => vec![SIGN_IN_MESSAGE.to_string()],
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_email_becomes_conflict() {
        let err: AuthError = StoreError::DuplicateEmail.into();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            err.client_messages(),
            vec!["User with given email already exists".to_string()]
        );
    }

    #[test]
    fn test_store_errors_are_opaque() {
        let err: AuthError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.client_messages(), vec![INTERNAL_ERROR_MESSAGE.to_string()]);
    }

    #[test]
    fn test_expiry_overflow_is_internal() {
        let err = AuthError::from(TokenError::ExpiryOutOfRange);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.client_messages(), vec![INTERNAL_ERROR_MESSAGE.to_string()]);
    }

    #[test]
    fn test_token_failures_share_one_message() {
        for token_err in [TokenError::BadSignature, TokenError::Expired, TokenError::Malformed] {
            let err = AuthError::from(token_err);
            assert_eq!(err.kind(), ErrorKind::Authentication);
            assert_eq!(err.client_messages(), vec![SIGN_IN_MESSAGE.to_string()]);
        }
    }

    #[test]
    fn test_validation_messages_passed_through() {
        let err = AuthError::Validation(vec!["Missing email".into(), "Missing password".into()]);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.client_messages().len(), 2);
        assert!(err.to_string().contains("Missing email, Missing password"));
    }
}
