//! Session token issuing and verification.

use super::{
    errors::{AuthResult, TokenError},
    models::{IssuedSession, SessionClaims, UserRecord},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};

/// Mints and verifies HS256 session tokens.
///
/// Tokens carry the user's email and id plus issue and expiry timestamps.
/// Verification is pure, so one issuer can be shared across any number of
/// concurrent requests.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer signing with `secret`, producing tokens valid for `ttl`
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user`, returning it with the sanitized view
    pub fn issue(&self, user: &UserRecord) -> AuthResult<IssuedSession> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// Identical user and time produce an identical token.
    pub fn issue_at(&self, user: &UserRecord, now: DateTime<Utc>) -> AuthResult<IssuedSession> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;
        let claims = SessionClaims {
            sub: user.id,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;

        Ok(IssuedSession {
            user: user.sanitize(),
            token,
        })
    }

    /// Verify a token's signature and expiry.
    ///
    /// Never panics on attacker-controlled input; every failure is a typed
    /// [`TokenError`].
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            },
        )?;

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Profile;
    use uuid::Uuid;

    const SECRET: &str = "test_secret_key_for_testing_only_0123456789";

    fn user() -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            is_chef: false,
            profile: Profile::default(),
            created_at: Utc::now(),
        }
    }

    /// Change one character in the payload segment of a JWT
    fn flip_payload_char(token: &str) -> String {
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let payload = &mut parts[1];
        let idx = payload.len() / 2;
        let replacement = if payload.as_bytes()[idx] == b'A' { "B" } else { "A" };
        payload.replace_range(idx..idx + 1, replacement);
        parts.join(".")
    }

    #[test]
    fn test_issue_then_verify() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(1));
        let user = user();
        let session = issuer.issue(&user).unwrap();

        let claims = issuer.verify(&session.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(session.user.email, "a@b.com");
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let issuer = TokenIssuer::new(SECRET, Duration::MAX);

        let err = issuer.issue(&user()).unwrap_err();
        assert!(matches!(
            err,
            crate::auth::AuthError::InvalidSession(TokenError::ExpiryOutOfRange)
        ));
    }

    #[test]
    fn test_issue_is_deterministic_for_same_time() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(1));
        let user = user();
        let now = Utc::now();

        let a = issuer.issue_at(&user, now).unwrap();
        let b = issuer.issue_at(&user, now).unwrap();
        let c = issuer.issue_at(&user, now + Duration::seconds(1)).unwrap();
        assert_eq!(a.token, b.token);
        assert_ne!(a.token, c.token);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new(SECRET, Duration::minutes(5));
        let past = Utc::now() - Duration::minutes(10);
        let session = issuer.issue_at(&user(), past).unwrap();

        assert!(matches!(issuer.verify(&session.token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_expiry_one_second_ago_rejected() {
        let issuer = TokenIssuer::new(SECRET, Duration::minutes(5));
        let past = Utc::now() - Duration::minutes(5) - Duration::seconds(1);
        let session = issuer.issue_at(&user(), past).unwrap();

        assert!(matches!(issuer.verify(&session.token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(1));
        let session = issuer.issue(&user()).unwrap();
        let tampered = flip_payload_char(&session.token);

        assert!(issuer.verify(&tampered).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(1));
        let other = TokenIssuer::new("another_secret_key_that_is_long_enough!!", Duration::hours(1));
        let session = other.issue(&user()).unwrap();

        assert!(matches!(issuer.verify(&session.token), Err(TokenError::BadSignature)));
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = TokenIssuer::new(SECRET, Duration::hours(1));
        for input in ["", "abc", "a.b.c", "....", "\u{0}\u{1}"] {
            assert!(issuer.verify(input).is_err(), "accepted {:?}", input);
        }
    }
}
