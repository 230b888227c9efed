//! HTTP API client for the chef marketplace server.
//!
//! The session token travels in the server's `token` cookie, kept in the
//! client's cookie store, so requests after a login are authenticated without
//! handling the token explicitly.

use async_trait::async_trait;
use chef_market::auth::{
    ChefProfilePayload, IssuedSession, LoginPayload, ProfileUpdatePayload, PublicUser,
    RegisterPayload,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Errors returned by an [`AuthApi`] transport
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to reach server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server rejected request ({status}): {}", .errors.join(", "))]
    Api { status: u16, errors: Vec<String> },
}

impl ClientError {
    /// Messages suitable for showing to the user
    pub fn messages(&self) -> Vec<String> {
        match self {
            ClientError::Transport(_) => vec!["Unable to reach the server".to_string()],
            ClientError::Api { errors, .. } => errors.clone(),
        }
    }
}

/// Server operations the session context depends on
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, payload: &RegisterPayload) -> Result<IssuedSession, ClientError>;

    async fn login(&self, payload: &LoginPayload) -> Result<IssuedSession, ClientError>;

    /// Resolve the session held in the cookie store
    async fn current_session(&self) -> Result<IssuedSession, ClientError>;

    async fn logout(&self) -> Result<(), ClientError>;

    async fn update_profile(
        &self,
        payload: &ProfileUpdatePayload,
    ) -> Result<PublicUser, ClientError>;

    async fn register_chef(&self, payload: &ChefProfilePayload)
    -> Result<PublicUser, ClientError>;

    async fn update_chef_specialty(
        &self,
        cuisine_specialty: &[String],
    ) -> Result<PublicUser, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    user: PublicUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpecialtyRequest<'a> {
    cuisine_specialty: &'a [String],
}

/// API client for communicating with the server
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client with an empty cookie store
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Server base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Decode a success body or the `{"errors": [..]}` envelope
async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let errors = match response.json::<ErrorBody>().await {
        Ok(body) => body.errors,
        Err(_) => vec![format!("Unexpected response ({})", status)],
    };
    log::debug!("Request failed with {}: {:?}", status, errors);

    Err(ClientError::Api {
        status: status.as_u16(),
        errors,
    })
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn register(&self, payload: &RegisterPayload) -> Result<IssuedSession, ClientError> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(payload)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn login(&self, payload: &LoginPayload) -> Result<IssuedSession, ClientError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(payload)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn current_session(&self) -> Result<IssuedSession, ClientError> {
        let response = self.client.get(self.url("/auth/user")).send().await?;
        parse_response(response).await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let response = self.client.post(self.url("/auth/logout")).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(ClientError::Api {
            status: status.as_u16(),
            errors: vec![format!("Logout failed ({})", status)],
        })
    }

    async fn update_profile(
        &self,
        payload: &ProfileUpdatePayload,
    ) -> Result<PublicUser, ClientError> {
        let response = self
            .client
            .put(self.url("/auth/user"))
            .json(payload)
            .send()
            .await?;
        parse_response::<PublicUser>(response).await
    }

    async fn register_chef(
        &self,
        payload: &ChefProfilePayload,
    ) -> Result<PublicUser, ClientError> {
        let response = self
            .client
            .post(self.url("/chefs"))
            .json(payload)
            .send()
            .await?;
        Ok(parse_response::<UserBody>(response).await?.user)
    }

    async fn update_chef_specialty(
        &self,
        cuisine_specialty: &[String],
    ) -> Result<PublicUser, ClientError> {
        let response = self
            .client
            .put(self.url("/chefs"))
            .json(&SpecialtyRequest { cuisine_specialty })
            .send()
            .await?;
        Ok(parse_response::<UserBody>(response).await?.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://127.0.0.1:3001/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:3001");
        assert_eq!(client.url("/auth/user"), "http://127.0.0.1:3001/auth/user");
    }

    #[test]
    fn test_api_error_messages() {
        let err = ClientError::Api {
            status: 400,
            errors: vec!["Missing email".to_string(), "Missing password".to_string()],
        };
        assert_eq!(err.messages().len(), 2);
        assert!(err.to_string().contains("Missing email, Missing password"));
    }
}
