//! `security_center_subscription_pricing` resource.
//!
//! The pricing always exists for a subscription: create and update are the
//! same remote call, and delete cannot remove it. All this resource really
//! does is flip the tier between Free and Standard.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::client::PricingClient;
use crate::error::{ClientError, SecurityCenterError, SecurityCenterResult};
use crate::id::PricingId;
use crate::models::{Pricing, PricingSetting};
use crate::timeouts::{OperationContext, ResourceTimeouts, StopSignal};

/// Result of reading the pricing back from the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    pub setting: PricingSetting,
    /// `false` when the service reported the pricing as not found; the
    /// setting's ID has been cleared and the caller should drop its record
    pub exists: bool,
}

/// What "delete" means for a pricing that cannot be deleted
#[async_trait]
pub trait DeletePolicy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn on_delete(
        &self,
        client: &dyn PricingClient,
        ctx: &OperationContext,
        setting: &PricingSetting,
    ) -> SecurityCenterResult<()>;
}

/// Leave the remote pricing untouched; only the local record goes away.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetainOnDelete;

#[async_trait]
impl DeletePolicy for RetainOnDelete {
    fn name(&self) -> &'static str {
        "retain"
    }

    async fn on_delete(
        &self,
        _client: &dyn PricingClient,
        _ctx: &OperationContext,
        setting: &PricingSetting,
    ) -> SecurityCenterResult<()> {
        debug!(
            pricing_name = setting.effective_pricing_name(),
            "Security Center Subscription pricing cannot be deleted, leaving it in place"
        );
        Ok(())
    }
}

/// Lifecycle operations for the subscription pricing
pub struct PricingResource {
    timeouts: ResourceTimeouts,
    delete_policy: Box<dyn DeletePolicy>,
}

impl Default for PricingResource {
    fn default() -> Self {
        Self::new(ResourceTimeouts::default())
    }
}

impl PricingResource {
    pub fn new(timeouts: ResourceTimeouts) -> Self {
        Self {
            timeouts,
            delete_policy: Box::new(RetainOnDelete),
        }
    }

    pub fn with_delete_policy(mut self, policy: impl DeletePolicy + 'static) -> Self {
        self.delete_policy = Box::new(policy);
        self
    }

    pub fn timeouts(&self) -> &ResourceTimeouts {
        &self.timeouts
    }

    pub fn delete_policy(&self) -> &dyn DeletePolicy {
        self.delete_policy.as_ref()
    }

    /// Create or update the pricing tier and return the pricing's ID.
    ///
    /// There is no "already exists" check: the pricing always exists.
    #[instrument(skip_all, fields(pricing_name = setting.effective_pricing_name(), tier = %setting.tier))]
    pub async fn apply<C: PricingClient>(
        &self,
        client: &C,
        stop: &StopSignal,
        setting: &PricingSetting,
    ) -> SecurityCenterResult<String> {
        let ctx = if setting.id.is_some() {
            self.timeouts.for_update(stop)
        } else {
            self.timeouts.for_create(stop)
        };
        let name = setting.effective_pricing_name();

        ctx.run(client.update(name, Pricing::for_tier(setting.tier)))
            .await
            .map_err(|source| SecurityCenterError::RemoteWrite {
                name: name.to_string(),
                source,
            })?;

        let pricing = ctx
            .run(client.get(name))
            .await
            .map_err(|source| SecurityCenterError::RemoteRead {
                name: name.to_string(),
                source,
            })?;

        let id = pricing
            .resource_id()
            .ok_or_else(|| SecurityCenterError::MissingIdentifier(name.to_string()))?
            .to_string();

        info!(id = %id, "Security Center Subscription pricing applied");
        Ok(id)
    }

    /// Apply, then read back the resulting state, as a create/update is
    /// expected to leave the record fully in sync.
    pub async fn apply_and_refresh<C: PricingClient>(
        &self,
        client: &C,
        stop: &StopSignal,
        setting: &PricingSetting,
    ) -> SecurityCenterResult<RefreshOutcome> {
        let id = self.apply(client, stop, setting).await?;
        let applied = PricingSetting {
            id: Some(id),
            ..setting.clone()
        };
        self.refresh(client, stop, &applied).await
    }

    /// Read the pricing and copy its tier back into the setting.
    #[instrument(skip_all, fields(pricing_name = setting.effective_pricing_name()))]
    pub async fn refresh<C: PricingClient>(
        &self,
        client: &C,
        stop: &StopSignal,
        setting: &PricingSetting,
    ) -> SecurityCenterResult<RefreshOutcome> {
        let mut updated = setting.clone();

        let Some(pricing) = self.fetch(client, stop, setting.effective_pricing_name()).await? else {
            updated.id = None;
            return Ok(RefreshOutcome {
                setting: updated,
                exists: false,
            });
        };

        if let Some(tier) = pricing.tier() {
            updated.tier = tier;
        }
        if let Some(id) = pricing.resource_id() {
            updated.id = Some(id.to_string());
        }

        Ok(RefreshOutcome {
            setting: updated,
            exists: true,
        })
    }

    /// Fetch under the read budget; `None` when the service reports not found.
    async fn fetch<C: PricingClient>(
        &self,
        client: &C,
        stop: &StopSignal,
        name: &str,
    ) -> SecurityCenterResult<Option<Pricing>> {
        let ctx = self.timeouts.for_read(stop);

        match ctx.run(client.get(name)).await {
            Ok(pricing) => Ok(Some(pricing)),
            Err(err) if err.is_not_found() => {
                debug!(error = %err, "Security Center Subscription pricing was not found");
                Ok(None)
            }
            Err(source) => Err(SecurityCenterError::RemoteRead {
                name: name.to_string(),
                source,
            }),
        }
    }

    /// Delete the resource according to the configured [`DeletePolicy`].
    #[instrument(skip_all, fields(pricing_name = setting.effective_pricing_name(), policy = self.delete_policy.name()))]
    pub async fn remove<C: PricingClient>(
        &self,
        client: &C,
        stop: &StopSignal,
        setting: &PricingSetting,
    ) -> SecurityCenterResult<()> {
        debug!("Security Center Subscription deletion invocation");
        let ctx = self.timeouts.for_delete(stop);
        self.delete_policy.on_delete(client, &ctx, setting).await
    }

    /// Adopt an existing pricing by its ARM ID.
    ///
    /// Unlike [`refresh`](Self::refresh) there is no configured tier to fall
    /// back on, so a response without one is rejected.
    #[instrument(skip(self, client, stop))]
    pub async fn import<C: PricingClient>(
        &self,
        client: &C,
        stop: &StopSignal,
        id: &str,
    ) -> SecurityCenterResult<PricingSetting> {
        let parsed: PricingId = id.parse()?;

        let pricing = self
            .fetch(client, stop, &parsed.name)
            .await?
            .ok_or_else(|| SecurityCenterError::ImportNotFound(id.to_string()))?;

        let tier = pricing.tier().ok_or_else(|| SecurityCenterError::RemoteRead {
            name: parsed.name.clone(),
            source: ClientError::Parse("response carried no pricingTier".to_string()),
        })?;

        Ok(PricingSetting {
            tier,
            pricing_name: Some(parsed.name),
            id: Some(pricing.resource_id().unwrap_or(id).to_string()),
        })
    }
}
