//! Identity service client.
//!
//! The portal never handles passwords. A buyer signs in with the identity
//! service, then hands the resulting access token to `POST /auth/session`;
//! the portal verifies it here and keeps the identity in its own session.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use wholesale_core::{BuyerId, PortalRole};

use crate::config::IdentityConfig;

/// Errors from the identity service.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The access token was rejected.
    #[error("invalid or expired access token")]
    InvalidToken,

    /// The service answered with an unexpected status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The user payload could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Client could not be constructed.
    #[error("Client setup error: {0}")]
    Setup(String),
}

/// A verified identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser {
    pub id: BuyerId,
    pub email: String,
    pub role: PortalRole,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    email: Option<String>,
    #[serde(default)]
    app_metadata: AppMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct AppMetadata {
    role: Option<String>,
}

impl TryFrom<UserResponse> for VerifiedUser {
    type Error = IdentityError;

    fn try_from(user: UserResponse) -> Result<Self, Self::Error> {
        let id = user
            .id
            .parse()
            .map_err(|e| IdentityError::Parse(format!("user id {:?}: {e}", user.id)))?;
        let role = user
            .app_metadata
            .role
            .as_deref()
            .and_then(|r| r.parse().ok())
            .unwrap_or_default();

        Ok(Self {
            id,
            email: user.email.unwrap_or_default(),
            role,
        })
    }
}

/// Client for verifying access tokens against the identity service.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    user_url: String,
}

impl IdentityClient {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Setup` if the API key is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| IdentityError::Setup(format!("Invalid API key header: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| IdentityError::Setup(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(IdentityClientInner {
                client,
                user_url: format!("{}/auth/v1/user", config.url.trim_end_matches('/')),
            }),
        })
    }

    /// Resolve an access token to the user it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidToken` for 401/403 answers and other
    /// variants for transport or payload failures.
    #[instrument(skip(self, access_token))]
    pub async fn verify(&self, access_token: &SecretString) -> Result<VerifiedUser, IdentityError> {
        let response = self
            .inner
            .client
            .get(&self.inner.user_url)
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(IdentityError::InvalidToken);
        }

        let response_text = response.text().await?;
        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Identity service returned non-success status"
            );
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        let user: UserResponse =
            serde_json::from_str(&response_text).map_err(|e| IdentityError::Parse(e.to_string()))?;
        user.try_into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_staff_role() {
        let json = r#"{
            "id": "8c4a3f7e-2b1d-4e59-9a6c-0f3e5d7b9a21",
            "email": "orders@streim.nl",
            "app_metadata": {"provider": "email", "role": "admin"}
        }"#;
        let user: VerifiedUser = serde_json::from_str::<UserResponse>(json)
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(user.role, PortalRole::Staff);
        assert_eq!(user.email, "orders@streim.nl");
    }

    #[test]
    fn test_user_response_defaults_to_buyer() {
        let json = r#"{"id": "8c4a3f7e-2b1d-4e59-9a6c-0f3e5d7b9a21", "email": "a@b.nl"}"#;
        let user: VerifiedUser = serde_json::from_str::<UserResponse>(json)
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(user.role, PortalRole::Buyer);
    }

    #[test]
    fn test_user_response_bad_id() {
        let json = r#"{"id": "not-a-uuid"}"#;
        let result: Result<VerifiedUser, _> =
            serde_json::from_str::<UserResponse>(json).unwrap().try_into();
        assert!(matches!(result, Err(IdentityError::Parse(_))));
    }
}
