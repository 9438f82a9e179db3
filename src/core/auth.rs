use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::core::error::CostError;
use crate::core::process;

pub const TOKEN_ENV: &str = "AZURE_ACCESS_TOKEN";
const MANAGEMENT_RESOURCE: &str = "https://management.azure.com/";

/// Supplies the bearer token for the cost API.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, CostError>;
}

/// A token handed in directly (env var or test).
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, CostError> {
        if self.0.trim().is_empty() {
            return Err(CostError::Credential(format!("{} is empty", TOKEN_ENV)));
        }
        Ok(self.0.trim().to_string())
    }
}

// --- Azure CLI session ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzAccessToken {
    access_token: Option<String>,
    /// Unix timestamp; only present in newer CLI versions
    #[serde(rename = "expires_on")]
    expires_on: Option<i64>,
}

/// Token exchanged from the locally cached `az login` session.
pub struct AzCliToken;

fn parse_az_token(json: &str) -> Result<String, CostError> {
    let token: AzAccessToken = serde_json::from_str(json).map_err(|e| {
        CostError::Credential(format!("cannot parse `az account get-access-token` output: {}", e))
    })?;

    if let Some(expiry) = token.expires_on.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)) {
        if expiry <= Utc::now() {
            tracing::warn!(%expiry, "Azure CLI returned an expired token");
        }
    }

    match token.access_token {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(CostError::Credential(
            "missing 'accessToken' in Azure CLI output".to_string(),
        )),
    }
}

#[async_trait]
impl TokenSource for AzCliToken {
    async fn access_token(&self) -> Result<String, CostError> {
        let output = process::run_az(&[
            "account",
            "get-access-token",
            "--resource",
            MANAGEMENT_RESOURCE,
            "--output",
            "json",
        ])
        .await
        .map_err(|e| {
            CostError::Credential(format!(
                "no usable Azure session, run `az login` or set {} ({:#})",
                TOKEN_ENV, e
            ))
        })?;
        parse_az_token(&output)
    }
}

/// Pick the token source: `AZURE_ACCESS_TOKEN` if set, else the Azure CLI.
pub fn default_token_source() -> Box<dyn TokenSource> {
    match std::env::var(TOKEN_ENV) {
        Ok(token) if !token.is_empty() => {
            tracing::debug!("using bearer token from {}", TOKEN_ENV);
            Box::new(StaticToken(token))
        }
        _ => Box::new(AzCliToken),
    }
}
