use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::Pricing;

/// Management-plane client for `Microsoft.Security/pricings`.
///
/// Pricings are keyed by name within the subscription the client is bound to.
/// Implementations map a 404 to [`ClientError::NotFound`](crate::ClientError::NotFound)
/// so callers can tell "gone" apart from other failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PricingClient: Send + Sync {
    /// Create or update the pricing, returning the service's view of it
    async fn update(&self, pricing_name: &str, pricing: Pricing) -> ClientResult<Pricing>;

    /// Fetch the pricing
    async fn get(&self, pricing_name: &str) -> ClientResult<Pricing>;
}
