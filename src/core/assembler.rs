use crate::core::client::{CostQueryClient, Transport};
use crate::core::error::CostError;
use crate::core::models::cost::{CostItem, CostNamedItem, ReportBundle};
use crate::core::models::params::ReportParameters;
use crate::core::query::normalizer::{normalize_cost_items, normalize_named_items};
use crate::core::query::ReportKind;

async fn fetch_cost_items<T: Transport>(
    client: &CostQueryClient<T>,
    params: &ReportParameters,
    kind: ReportKind,
) -> Result<Vec<CostItem>, CostError> {
    let rows = client.fetch_rows(params, kind).await?;
    normalize_cost_items(kind, &rows)
}

async fn fetch_named_items<T: Transport>(
    client: &CostQueryClient<T>,
    params: &ReportParameters,
    kind: ReportKind,
) -> Result<Vec<CostNamedItem>, CostError> {
    let rows = client.fetch_rows(params, kind).await?;
    normalize_named_items(kind, &rows)
}

/// Fetch all four report kinds concurrently and join them into one bundle.
///
/// The first failing pipeline fails the whole report; the remaining
/// in-flight fetches are dropped.
pub async fn assemble_report<T: Transport>(
    client: &CostQueryClient<T>,
    params: &ReportParameters,
) -> Result<ReportBundle, CostError> {
    tracing::info!(
        subscription = %params.subscription_id(),
        timeframe = ?params.timeframe(),
        "fetching cost report"
    );

    let (daily, forecast, by_service, by_location) = tokio::try_join!(
        fetch_cost_items(client, params, ReportKind::DailyCost),
        fetch_cost_items(client, params, ReportKind::Forecast),
        fetch_named_items(client, params, ReportKind::ByService),
        fetch_named_items(client, params, ReportKind::ByLocation),
    )?;

    tracing::debug!(
        daily = daily.len(),
        forecast = forecast.len(),
        services = by_service.len(),
        locations = by_location.len(),
        "assembled cost report"
    );

    Ok(ReportBundle::new(daily, forecast, by_service, by_location))
}
