use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::error::{SecurityCenterError, SecurityCenterResult};

/// Pricing name used when none is configured.
///
/// The API declares the name as free-form, but the live service rejects
/// anything else for a subscription scope:
/// `Pricing name '...' is not allowed. Expected 'default' for this scope.`
pub const DEFAULT_PRICING_NAME: &str = "default";

/// Security Center pricing tier
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    VariantNames,
)]
pub enum PricingTier {
    #[default]
    Free,
    Standard,
}

/// Parse a tier as accepted from configuration (case-sensitive).
pub fn parse_tier(value: &str) -> SecurityCenterResult<PricingTier> {
    value
        .parse::<PricingTier>()
        .map_err(|_| SecurityCenterError::InvalidTier {
            value: value.to_string(),
            expected: PricingTier::VARIANTS.join(", "),
        })
}

/// Resolve the pricing name that is actually sent to the API.
pub fn resolve_pricing_name(name: Option<&str>) -> &str {
    match name {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_PRICING_NAME,
    }
}

/// `Microsoft.Security/pricings` resource as exchanged with the management API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PricingProperties>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingProperties {
    pub pricing_tier: PricingTier,
    /// Read-only, ISO 8601 duration reported by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_trial_remaining_time: Option<String>,
}

impl Pricing {
    /// Write descriptor: carries the tier and nothing else.
    pub fn for_tier(tier: PricingTier) -> Self {
        Self {
            properties: Some(PricingProperties {
                pricing_tier: tier,
                free_trial_remaining_time: None,
            }),
            ..Default::default()
        }
    }

    pub fn tier(&self) -> Option<PricingTier> {
        self.properties.as_ref().map(|p| p.pricing_tier)
    }

    /// Identifier, treating an empty string the same as an absent one
    pub fn resource_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Local state of the `security_center_subscription_pricing` resource.
///
/// This is the record the lifecycle engine hands in and persists afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSetting {
    pub tier: PricingTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl PricingSetting {
    pub fn new(tier: PricingTier) -> Self {
        Self {
            tier,
            ..Default::default()
        }
    }

    pub fn with_pricing_name(mut self, name: impl Into<String>) -> Self {
        self.pricing_name = Some(name.into());
        self
    }

    pub fn effective_pricing_name(&self) -> &str {
        resolve_pricing_name(self.pricing_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tier_accepts_enumerated_values() {
        assert_eq!(parse_tier("Free").unwrap(), PricingTier::Free);
        assert_eq!(parse_tier("Standard").unwrap(), PricingTier::Standard);
    }

    #[test]
    fn test_parse_tier_is_case_sensitive() {
        let err = parse_tier("standard").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("standard"));
        assert!(message.contains("Free, Standard"));
        assert!(parse_tier("").is_err());
    }

    #[test]
    fn test_resolve_pricing_name() {
        assert_eq!(resolve_pricing_name(None), DEFAULT_PRICING_NAME);
        assert_eq!(resolve_pricing_name(Some("")), DEFAULT_PRICING_NAME);
        assert_eq!(resolve_pricing_name(Some("VirtualMachines")), "VirtualMachines");
    }

    #[test]
    fn test_write_descriptor_only_carries_tier() {
        let body = serde_json::to_value(Pricing::for_tier(PricingTier::Standard)).unwrap();
        assert_eq!(body, json!({ "properties": { "pricingTier": "Standard" } }));
    }

    #[test]
    fn test_pricing_deserializes_management_response() {
        let pricing: Pricing = serde_json::from_value(json!({
            "id": "/subscriptions/123/providers/Microsoft.Security/pricings/default",
            "name": "default",
            "type": "Microsoft.Security/pricings",
            "properties": { "pricingTier": "Free", "freeTrialRemainingTime": "P29DT23H" }
        }))
        .unwrap();

        assert_eq!(pricing.tier(), Some(PricingTier::Free));
        assert_eq!(pricing.resource_type.as_deref(), Some("Microsoft.Security/pricings"));
        assert_eq!(
            pricing.resource_id(),
            Some("/subscriptions/123/providers/Microsoft.Security/pricings/default")
        );
    }

    #[test]
    fn test_empty_id_is_treated_as_missing() {
        let pricing = Pricing {
            id: Some(String::new()),
            ..Pricing::for_tier(PricingTier::Free)
        };
        assert_eq!(pricing.resource_id(), None);
    }

    #[test]
    fn test_setting_serializes_with_config_field_names() {
        let setting = PricingSetting::new(PricingTier::Standard).with_pricing_name("default");
        let value = serde_json::to_value(&setting).unwrap();
        assert_eq!(value, json!({ "tier": "Standard", "pricingName": "default" }));
    }
}
