//! Uniform error responses.
//!
//! Every failure leaves the server as `{"errors": [..]}`. Internal failures
//! are logged with full detail and answered with a single generic message.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chef_market::auth::{AuthError, ErrorKind, errors::SIGN_IN_MESSAGE};
use serde::{Deserialize, Serialize};

/// Error body shared by all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

impl ErrorResponse {
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }
}

/// Errors produced by API handlers and middleware
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),

    #[error("No valid session")]
    Unauthenticated,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => match err.kind() {
                ErrorKind::Validation | ErrorKind::Authentication | ErrorKind::Conflict => {
                    StatusCode::BAD_REQUEST
                }
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
        }
    }

    /// Client-safe messages
    pub fn messages(&self) -> Vec<String> {
        match self {
            ApiError::Auth(err) => err.client_messages(),
            ApiError::MalformedBody(_) => vec!["Malformed request body".to_string()],
            ApiError::Unauthenticated => vec![SIGN_IN_MESSAGE.to_string()],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed with internal error");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                errors: self.messages(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chef_market::auth::StoreError;
    use http_body_util::BodyExt;

    async fn body_of(err: ApiError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_internal_error_is_generic() {
        let err = ApiError::Auth(AuthError::from(StoreError::Hashing));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.errors, vec!["Unexpected error occurred".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_credentials_is_bad_request() {
        let (status, body) = body_of(ApiError::Auth(AuthError::InvalidCredentials)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.errors, vec!["Email or password invalid".to_string()]);
    }

    #[tokio::test]
    async fn test_unauthenticated_is_401() {
        let (status, body) = body_of(ApiError::Unauthenticated).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.errors, vec!["Please sign in".to_string()]);
    }

    #[tokio::test]
    async fn test_validation_lists_every_message() {
        let err = ApiError::Auth(AuthError::Validation(vec![
            "Missing email".to_string(),
            "Missing password".to_string(),
        ]));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.errors.len(), 2);
    }
}
