//! Supabase auth session validator.
//!
//! Asks `GET {provider}/auth/v1/user` whether the bearer token belongs to a
//! live user. 2xx with a user id means yes, 401/403 means no, anything else
//! is an error the caller treats as "no".

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::auth::session::{SessionValidator, ValidatorError};

const USER_ENDPOINT: &str = "auth/v1/user";

#[derive(Debug, Deserialize)]
struct ProviderUser {
    #[serde(default)]
    id: String,
}

/// Validates access tokens against a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseValidator {
    client: reqwest::Client,
    user_endpoint: Url,
    anon_key: String,
}

impl SupabaseValidator {
    pub fn new(provider_url: &str, anon_key: impl Into<String>) -> Result<Self, ValidatorError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ValidatorError::Misconfigured(e.to_string()))?;
        Self::with_client(client, provider_url, anon_key)
    }

    /// Use a preconfigured HTTP client (proxy settings, pools).
    pub fn with_client(
        client: reqwest::Client,
        provider_url: &str,
        anon_key: impl Into<String>,
    ) -> Result<Self, ValidatorError> {
        let mut base = Url::parse(provider_url)
            .map_err(|e| ValidatorError::Misconfigured(format!("{provider_url:?}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let user_endpoint = base
            .join(USER_ENDPOINT)
            .map_err(|e| ValidatorError::Misconfigured(e.to_string()))?;

        Ok(Self {
            client,
            user_endpoint,
            anon_key: anon_key.into(),
        })
    }

    pub fn user_endpoint(&self) -> &Url {
        &self.user_endpoint
    }
}

#[async_trait]
impl SessionValidator for SupabaseValidator {
    async fn validate(&self, access_token: &str) -> Result<bool, ValidatorError> {
        let response = self
            .client
            .get(self.user_endpoint.clone())
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ValidatorError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(ValidatorError::UnexpectedStatus(status.as_u16()));
        }

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|e| ValidatorError::Decode(e.to_string()))?;
        Ok(!user.id.is_empty())
    }
}
