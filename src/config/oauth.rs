//! OAuth provider and session configuration.

use serde::{Deserialize, Serialize};

/// OAuth authorization-code flow settings (Google-shaped defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub client_id: String,
    /// Normally supplied via `TOLLGATE_OAUTH_CLIENT_SECRET`.
    #[serde(skip_serializing)]
    pub client_secret: String,
    /// Callback URL registered with the provider.
    pub redirect_url: String,
    pub scopes: Vec<String>,
    /// Browser session lifetime.
    pub session_ttl_seconds: u64,
    /// Trial credits granted with a freshly issued API key.
    pub trial_credits: u32,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: "http://localhost:3000/auth/google/callback".to_string(),
            scopes: vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
            session_ttl_seconds: 86_400,
            trial_credits: 5,
        }
    }
}
