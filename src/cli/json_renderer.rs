use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

use crate::cli::renderer::Renderer;
use crate::core::models::cost::{CostItem, CostNamedItem, ReportBundle};
use crate::core::models::params::{ReportParameters, SubscriptionId, Timeframe};
use crate::core::summary::{compute_totals, CostTotals};

#[derive(Serialize)]
struct JsonReport {
    subscription_id: SubscriptionId,
    timeframe: Timeframe,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<NaiveDate>,
    totals: CostTotals,
    daily_costs: Vec<CostItem>,
    forecasted_costs: Vec<CostItem>,
    costs_by_service: Vec<CostNamedItem>,
    costs_by_location: Vec<CostNamedItem>,
}

/// Machine-readable output: one JSON object per run.
pub struct JsonRenderer {
    pub pretty: bool,
    pub today: NaiveDate,
}

impl Renderer for JsonRenderer {
    fn render(
        &self,
        params: &ReportParameters,
        report: ReportBundle,
        out: &mut dyn Write,
    ) -> Result<()> {
        let period = params.period();
        let totals = compute_totals(&report, self.today);
        let payload = JsonReport {
            subscription_id: params.subscription_id(),
            timeframe: period.timeframe(),
            from: period.range().map(|r| r.from()),
            to: period.range().map(|r| r.to()),
            totals,
            daily_costs: report.daily_costs().to_vec(),
            forecasted_costs: report.forecasted_costs().to_vec(),
            costs_by_service: report.costs_by_service().to_vec(),
            costs_by_location: report.costs_by_location().to_vec(),
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&payload)?
        } else {
            serde_json::to_string(&payload)?
        };
        writeln!(out, "{}", json)?;
        Ok(())
    }
}
