use async_trait::async_trait;

use crate::core::error::CostError;
use crate::core::models::params::SubscriptionId;
use crate::core::process;

/// Side channel that names the subscription to report on when the user
/// didn't pass one.
#[async_trait]
pub trait SubscriptionLookup: Send + Sync {
    async fn current_subscription(&self) -> Result<SubscriptionId, CostError>;
}

/// Reads the active account of the Azure CLI session.
pub struct AzCliSubscription;

#[async_trait]
impl SubscriptionLookup for AzCliSubscription {
    async fn current_subscription(&self) -> Result<SubscriptionId, CostError> {
        let output = process::run_az(&["account", "show", "--query", "id", "--output", "tsv"])
            .await
            .map_err(|e| {
                CostError::Credential(format!(
                    "no subscription given and none found via the Azure CLI ({:#})",
                    e
                ))
            })?;
        output.parse().map_err(|_| {
            CostError::Credential(format!(
                "Azure CLI returned '{}', which is not a subscription id",
                output
            ))
        })
    }
}

/// Resolve the subscription: explicit flag, then config, then `lookup`.
pub async fn resolve_subscription(
    explicit: Option<SubscriptionId>,
    configured: Option<&str>,
    lookup: &dyn SubscriptionLookup,
) -> Result<SubscriptionId, CostError> {
    if let Some(id) = explicit {
        return Ok(id);
    }
    if let Some(raw) = configured.filter(|s| !s.trim().is_empty()) {
        return raw.parse().map_err(|_| {
            CostError::Config(format!("azure.subscription_id '{}' is not a valid id", raw))
        });
    }
    let id = lookup.current_subscription().await?;
    tracing::info!(subscription = %id, "using subscription from the Azure CLI session");
    Ok(id)
}
