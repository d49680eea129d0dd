//! Configuration for the security center pricing CLI

use core_config::{Environment, FromEnv};
use domain_security_center::{AzureConfig, ResourceTimeouts};
use eyre::{Result, WrapErr};

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub azure: AzureConfig,
    pub timeouts: ResourceTimeouts,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            environment: Environment::from_env(),
            azure: AzureConfig::from_env().wrap_err("Azure credentials are not configured")?,
            timeouts: ResourceTimeouts::from_env().wrap_err("Invalid resource timeouts")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("AZURE_TENANT_ID", Some("tenant")),
                ("AZURE_CLIENT_ID", Some("client")),
                ("AZURE_CLIENT_SECRET", Some("secret")),
                ("AZURE_SUBSCRIPTION_ID", Some("sub-123")),
                ("PRICING_TIMEOUT_READ_MINUTES", Some("10")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.environment.is_production());
                assert_eq!(config.azure.subscription_id, "sub-123");
                assert_eq!(config.timeouts.read, Duration::from_secs(600));
            },
        );
    }

    #[test]
    fn test_missing_credentials_is_reported() {
        temp_env::with_var_unset("AZURE_TENANT_ID", || {
            let err = Config::from_env().unwrap_err();
            assert!(format!("{err:?}").contains("AZURE_TENANT_ID"));
        });
    }
}
