//! Microsoft Entra ID client-credentials flow for the management plane.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::timeouts::deadline_after;

/// Refresh this long before the token actually expires
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Service principal credential with an in-memory token cache
#[derive(Clone)]
pub struct ClientSecretCredential {
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    client: Client,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl ClientSecretCredential {
    /// `scope` is usually `{resource manager endpoint}/.default`
    pub fn new(
        authority_host: &str,
        tenant_id: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                authority_host.trim_end_matches('/'),
                tenant_id
            ),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: scope.into(),
            client,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a valid access token, requesting a new one if the cached token is
    /// missing or about to expire
    pub async fn token(&self) -> ClientResult<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Instant::now() + EXPIRY_MARGIN {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let token = self.request_token().await?;

        let mut cache = self.token_cache.write().await;
        *cache = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: deadline_after(Duration::from_secs(token.expires_in)),
        });

        Ok(token.access_token)
    }

    async fn request_token(&self) -> ClientResult<TokenResponse> {
        debug!(client_id = %self.client_id, "Requesting management API token");

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let reason = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => format!("token endpoint returned {}", status),
            };
            return Err(ClientError::Auth(reason));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ClientError::Parse(format!("token response: {}", e)))
    }
}
