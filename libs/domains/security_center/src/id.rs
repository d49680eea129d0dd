use std::fmt;
use std::str::FromStr;

use crate::error::SecurityCenterError;

const PROVIDER_NAMESPACE: &str = "Microsoft.Security";

/// Parsed ARM ID of a subscription pricing:
/// `/subscriptions/{subscription}/providers/Microsoft.Security/pricings/{name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingId {
    pub subscription_id: String,
    pub name: String,
}

impl PricingId {
    pub fn new(subscription_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PricingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/providers/{}/pricings/{}",
            self.subscription_id, PROVIDER_NAMESPACE, self.name
        )
    }
}

impl FromStr for PricingId {
    type Err = SecurityCenterError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| SecurityCenterError::InvalidIdentifier {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = id.split('/').filter(|s| !s.is_empty()).collect();
        let &[subscriptions, subscription_id, providers, provider, pricings, name] =
            segments.as_slice()
        else {
            return Err(invalid(
                "expected /subscriptions/{id}/providers/Microsoft.Security/pricings/{name}",
            ));
        };

        // Segment keys are case-insensitive in ARM IDs, but their order is fixed.
        for (key, expected) in [
            (subscriptions, "subscriptions"),
            (providers, "providers"),
            (pricings, "pricings"),
        ] {
            if !key.eq_ignore_ascii_case(expected) {
                return Err(invalid(&format!("expected segment {expected:?}, found {key:?}")));
            }
        }

        if !provider.eq_ignore_ascii_case(PROVIDER_NAMESPACE) {
            return Err(invalid("expected provider Microsoft.Security"));
        }

        Ok(Self::new(subscription_id, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pricing_id() {
        let id: PricingId = "/subscriptions/00000000-0000-0000-0000-000000000000/providers/Microsoft.Security/pricings/default"
            .parse()
            .unwrap();
        assert_eq!(id.subscription_id, "00000000-0000-0000-0000-000000000000");
        assert_eq!(id.name, "default");
    }

    #[test]
    fn test_parse_is_case_insensitive_on_keys() {
        let id: PricingId = "/Subscriptions/abc/Providers/microsoft.security/Pricings/default"
            .parse()
            .unwrap();
        assert_eq!(id, PricingId::new("abc", "default"));
    }

    #[test]
    fn test_display_round_trips_to_canonical_form() {
        let id = PricingId::new("abc", "default");
        assert_eq!(
            id.to_string(),
            "/subscriptions/abc/providers/Microsoft.Security/pricings/default"
        );
        assert_eq!(id.to_string().parse::<PricingId>().unwrap(), id);
    }

    #[test]
    fn test_rejects_malformed_ids() {
        for bad in [
            "",
            "default",
            "/subscriptions/abc",
            "/subscriptions/abc/providers/Microsoft.Security",
            "/subscriptions/abc/providers/Microsoft.Compute/pricings/default",
            "/subscriptions/abc/resourceGroups/rg/providers/Microsoft.Security/pricings/default",
        ] {
            let err = bad.parse::<PricingId>().unwrap_err();
            assert!(
                matches!(err, SecurityCenterError::InvalidIdentifier { .. }),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_reordered_or_repeated_segments() {
        for bad in [
            "/providers/Microsoft.Security/subscriptions/abc/pricings/default",
            "/subscriptions/abc/pricings/default/providers/Microsoft.Security",
            "/subscriptions/abc/subscriptions/def/pricings/default",
            "/subscriptions/abc/providers/Microsoft.Security/pricings/default/pricings/other",
        ] {
            let err = bad.parse::<PricingId>().unwrap_err();
            assert!(
                matches!(err, SecurityCenterError::InvalidIdentifier { .. }),
                "expected {bad:?} to be rejected"
            );
        }
    }
}
