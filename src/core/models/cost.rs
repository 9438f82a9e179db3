use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// One day of cost in a time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostItem {
    pub date: NaiveDate,
    /// Cost in the billing currency
    pub amount: Decimal,
    pub amount_usd: Decimal,
    pub currency: String,
}

/// One bucket of a grouped breakdown (a service name or a location).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostNamedItem {
    pub name: String,
    pub amount: Decimal,
    pub amount_usd: Decimal,
    pub currency: String,
}

/// The four normalized views of one report run.
///
/// Built once by the assembler and handed to a renderer by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportBundle {
    daily_costs: Vec<CostItem>,
    forecasted_costs: Vec<CostItem>,
    costs_by_service: Vec<CostNamedItem>,
    costs_by_location: Vec<CostNamedItem>,
}

impl ReportBundle {
    pub fn new(
        daily_costs: Vec<CostItem>,
        forecasted_costs: Vec<CostItem>,
        costs_by_service: Vec<CostNamedItem>,
        costs_by_location: Vec<CostNamedItem>,
    ) -> Self {
        Self {
            daily_costs,
            forecasted_costs,
            costs_by_service,
            costs_by_location,
        }
    }

    pub fn daily_costs(&self) -> &[CostItem] {
        &self.daily_costs
    }

    pub fn forecasted_costs(&self) -> &[CostItem] {
        &self.forecasted_costs
    }

    pub fn costs_by_service(&self) -> &[CostNamedItem] {
        &self.costs_by_service
    }

    pub fn costs_by_location(&self) -> &[CostNamedItem] {
        &self.costs_by_location
    }
}
