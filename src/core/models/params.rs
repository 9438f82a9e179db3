use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::core::error::CostError;

/// Azure subscription identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl FromStr for SubscriptionId {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Uuid::parse_str(trimmed).map(Self).map_err(|_| {
            CostError::Parameter(format!("'{}' is not a valid subscription id", trimmed))
        })
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Hyphenated lowercase, the form the resource paths use
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Named date-range selector understood by the cost query API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Timeframe {
    BillingMonthToDate,
    MonthToDate,
    TheLastBillingMonth,
    TheLastMonth,
    WeekToDate,
    Custom,
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BillingMonthToDate => write!(f, "Billing month to date"),
            Self::MonthToDate => write!(f, "Month to date"),
            Self::TheLastBillingMonth => write!(f, "Last billing month"),
            Self::TheLastMonth => write!(f, "Last month"),
            Self::WeekToDate => write!(f, "Week to date"),
            Self::Custom => write!(f, "Custom"),
        }
    }
}

/// How the finished report is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    Console,
    Json,
}

impl OutputMode {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "console" | "table" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Inclusive calendar date range, `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }
}

/// A timeframe together with its explicit dates when it is `Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    timeframe: Timeframe,
    range: Option<DateRange>,
}

impl ReportPeriod {
    /// Validate a timeframe selection. Dates are required for `Custom` and
    /// rejected for every named timeframe.
    pub fn new(
        timeframe: Timeframe,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Self, CostError> {
        match (timeframe, from, to) {
            (Timeframe::Custom, Some(from), Some(to)) => {
                if from > to {
                    return Err(CostError::Parameter(format!(
                        "--from ({}) must not be after --to ({})",
                        from, to
                    )));
                }
                Ok(Self {
                    timeframe,
                    range: Some(DateRange { from, to }),
                })
            }
            (Timeframe::Custom, _, _) => Err(CostError::Parameter(
                "a custom timeframe requires both --from and --to".to_string(),
            )),
            (_, None, None) => Ok(Self {
                timeframe,
                range: None,
            }),
            (named, _, _) => Err(CostError::Parameter(format!(
                "--from/--to are only allowed with the custom timeframe, not '{}'",
                named
            ))),
        }
    }

    #[cfg(test)]
    pub fn named(timeframe: Timeframe) -> Result<Self, CostError> {
        Self::new(timeframe, None, None)
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn range(&self) -> Option<DateRange> {
        self.range
    }
}

/// Validated input for one report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportParameters {
    subscription_id: SubscriptionId,
    period: ReportPeriod,
    output: OutputMode,
}

impl ReportParameters {
    pub fn new(subscription_id: SubscriptionId, period: ReportPeriod, output: OutputMode) -> Self {
        Self {
            subscription_id,
            period,
            output,
        }
    }

    pub fn subscription_id(&self) -> SubscriptionId {
        self.subscription_id
    }

    pub fn period(&self) -> ReportPeriod {
        self.period
    }

    pub fn timeframe(&self) -> Timeframe {
        self.period.timeframe
    }

    pub fn output(&self) -> OutputMode {
        self.output
    }
}
