//! Security Center Domain
//!
//! Manages the Azure Security Center (Defender for Cloud) subscription pricing
//! tier as a declarative resource.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ PricingResource  │  ← apply / refresh / remove / import
//! └────────┬─────────┘
//!          │ OperationContext (deadline + stop signal)
//! ┌────────▼─────────┐
//! │  PricingClient   │  ← trait; AzurePricingClient talks to ARM
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │     Models       │  ← Pricing, PricingTier, PricingSetting
//! └──────────────────┘
//! ```

pub mod auth;
pub mod azure;
pub mod client;
pub mod error;
pub mod id;
pub mod models;
pub mod resource;
pub mod timeouts;

// Re-export commonly used types
pub use azure::{AzureConfig, AzurePricingClient};
pub use client::PricingClient;
pub use error::{ClientError, ClientResult, SecurityCenterError, SecurityCenterResult};
pub use id::PricingId;
pub use models::{
    parse_tier, resolve_pricing_name, Pricing, PricingProperties, PricingSetting, PricingTier,
    DEFAULT_PRICING_NAME,
};
pub use resource::{DeletePolicy, PricingResource, RefreshOutcome, RetainOnDelete};
pub use timeouts::{OperationContext, ResourceTimeouts, StopSignal};
