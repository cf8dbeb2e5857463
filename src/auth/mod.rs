//! OAuth identity client and session handling.
//!
//! The console delegates identity to an external OAuth provider
//! (Google-shaped endpoints by default): redirect the browser to the
//! authorize URL, exchange the callback code for an access token, fetch
//! the userinfo profile, and upsert the user row keyed by the provider's
//! opaque profile id.

pub mod session;

pub use session::{Session, SessionStore, SESSION_COOKIE};

use crate::config::OAuthConfig;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during the OAuth handshake.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Network connectivity error.
    #[error("identity provider network error: {0}")]
    Network(String),

    /// The provider rejected the exchange (4xx, 5xx).
    #[error("identity provider error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Response body doesn't match the expected shape.
    #[error("invalid identity provider response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Network(err.to_string())
    }
}

/// Resolved provider profile; `id` is the opaque external profile id used
/// as the owner id everywhere else.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthProfile {
    #[serde(rename = "sub")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth authorization-code flow client.
pub struct OAuthClient {
    auth_url: String,
    token_url: String,
    userinfo_url: String,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    scopes: String,
    client: Arc<Client>,
}

impl OAuthClient {
    pub fn new(config: &OAuthConfig, client: Arc<Client>) -> Self {
        Self {
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            userinfo_url: config.userinfo_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
            scopes: config.scopes.join(" "),
            client,
        }
    }

    /// Provider authorize URL the browser is redirected to.
    pub fn authorize_url(&self, state: &str) -> String {
        // Query values here are config-controlled identifiers and a UUID
        // state; percent-encoding is only needed for the scope spaces.
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.auth_url,
            self.client_id,
            self.redirect_url,
            self.scopes.replace(' ', "%20"),
            state
        )
    }

    /// Exchange the callback code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("redirect_uri", &self.redirect_url),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        Ok(token.access_token)
    }

    /// Fetch the userinfo profile for an access token.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, AuthError> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OAuthClient {
        OAuthClient {
            auth_url: "https://provider.example/auth".into(),
            token_url: "https://provider.example/token".into(),
            userinfo_url: "https://provider.example/userinfo".into(),
            client_id: "client-1".into(),
            client_secret: "secret".into(),
            redirect_url: "https://console.example/auth/google/callback".into(),
            scopes: "openid email profile".into(),
            client: Arc::new(Client::new()),
        }
    }

    #[test]
    fn test_authorize_url_carries_state_and_scopes() {
        let url = client().authorize_url("state-123");
        assert!(url.starts_with("https://provider.example/auth?"));
        assert!(url.contains("client_id=client-1"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("state=state-123"));
    }

    #[test]
    fn test_profile_deserializes_sub_as_id() {
        let profile: OAuthProfile = serde_json::from_str(
            r#"{"sub":"1234","name":"Ada","email":"ada@example.com","picture":null}"#,
        )
        .unwrap();
        assert_eq!(profile.id, "1234");
        assert!(profile.picture.is_none());
    }
}
