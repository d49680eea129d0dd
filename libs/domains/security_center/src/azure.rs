//! Azure Resource Manager implementation of [`PricingClient`].
//!
//! https://learn.microsoft.com/en-us/rest/api/defenderforcloud/pricings

use async_trait::async_trait;
use core_config::{env_or_default, env_required, ConfigError, FromEnv};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::auth::ClientSecretCredential;
use crate::client::PricingClient;
use crate::error::{ClientError, ClientResult};
use crate::models::Pricing;

/// Pricings API version that exposes the Free/Standard tiers
pub const PRICINGS_API_VERSION: &str = "2018-06-01";

const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://management.azure.com";
const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Service principal and subscription used for management calls
#[derive(Debug, Clone, Default)]
pub struct AzureConfig {
    /// Azure tenant ID
    pub tenant_id: String,
    /// Azure client (application) ID
    pub client_id: String,
    /// Azure client secret
    pub client_secret: String,
    /// Azure subscription ID the pricing belongs to
    pub subscription_id: String,
    /// Resource manager base URL, e.g. https://management.azure.com
    pub resource_manager_endpoint: String,
    /// Entra ID authority, e.g. https://login.microsoftonline.com
    pub authority_host: String,
}

impl FromEnv for AzureConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            tenant_id: env_required("AZURE_TENANT_ID")?,
            client_id: env_required("AZURE_CLIENT_ID")?,
            client_secret: env_required("AZURE_CLIENT_SECRET")?,
            subscription_id: env_required("AZURE_SUBSCRIPTION_ID")?,
            resource_manager_endpoint: env_or_default(
                "AZURE_RESOURCE_MANAGER_ENDPOINT",
                DEFAULT_RESOURCE_MANAGER_ENDPOINT,
            ),
            authority_host: env_or_default("AZURE_AUTHORITY_HOST", DEFAULT_AUTHORITY_HOST),
        })
    }
}

/// Error envelope returned by ARM
#[derive(Debug, Deserialize)]
struct ArmErrorResponse {
    error: ArmError,
}

#[derive(Debug, Deserialize)]
struct ArmError {
    code: String,
    message: String,
}

/// Pricings client bound to one subscription
pub struct AzurePricingClient {
    config: AzureConfig,
    client: Client,
    credential: ClientSecretCredential,
}

impl AzurePricingClient {
    pub fn new(config: AzureConfig) -> Self {
        let client = Client::new();
        let endpoint = config.resource_manager_endpoint.trim_end_matches('/');
        let credential = ClientSecretCredential::new(
            &config.authority_host,
            &config.tenant_id,
            config.client_id.clone(),
            config.client_secret.clone(),
            format!("{}/.default", endpoint),
            client.clone(),
        );

        Self {
            config,
            client,
            credential,
        }
    }

    pub fn subscription_id(&self) -> &str {
        &self.config.subscription_id
    }

    fn pricing_url(&self, pricing_name: &str) -> String {
        format!(
            "{}/subscriptions/{}/providers/Microsoft.Security/pricings/{}",
            self.config.resource_manager_endpoint.trim_end_matches('/'),
            self.config.subscription_id,
            urlencoding::encode(pricing_name)
        )
    }

    async fn send(&self, request: RequestBuilder, pricing_name: &str) -> ClientResult<Pricing> {
        let token = self.credential.token().await?;
        let response = request
            .query(&[("api-version", PRICINGS_API_VERSION)])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(pricing_name.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        response
            .json::<Pricing>()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}

fn api_error(status: StatusCode, body: &str) -> ClientError {
    match serde_json::from_str::<ArmErrorResponse>(body) {
        Ok(envelope) => ClientError::Api {
            status: status.as_u16(),
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            code: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: body.to_string(),
        },
    }
}

#[async_trait]
impl PricingClient for AzurePricingClient {
    #[instrument(skip(self, pricing), fields(subscription_id = %self.config.subscription_id))]
    async fn update(&self, pricing_name: &str, pricing: Pricing) -> ClientResult<Pricing> {
        debug!(tier = ?pricing.tier(), "PUT pricing");
        let request = self.client.put(self.pricing_url(pricing_name)).json(&pricing);
        self.send(request, pricing_name).await
    }

    #[instrument(skip(self), fields(subscription_id = %self.config.subscription_id))]
    async fn get(&self, pricing_name: &str) -> ClientResult<Pricing> {
        debug!("GET pricing");
        let request = self.client.get(self.pricing_url(pricing_name));
        self.send(request, pricing_name).await
    }
}
