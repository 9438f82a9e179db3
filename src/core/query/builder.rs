use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::models::params::{ReportParameters, Timeframe};
use crate::core::query::ReportKind;

const QUERY_TYPE: &str = "ActualCost";
const DATE_FORMAT: &str = "%Y-%m-%d";
const SORT_KEY: &str = "UsageDate";
const FIRST_PARTY_PUBLISHER: &str = "azure";

/// Request body for the Cost Management `query` and `forecast` operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDefinition {
    #[serde(rename = "type")]
    pub query_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<Timeframe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_period: Option<TimePeriod>,
    #[serde(rename = "dataSet")]
    pub dataset: Dataset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_actual_cost: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_fresh_partial_cost: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimePeriod {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granularity: Option<Granularity>,
    pub aggregation: BTreeMap<&'static str, Aggregation>,
    pub sorting: Vec<Sorting>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub grouping: Vec<Grouping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Granularity {
    Daily,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub name: &'static str,
    pub function: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sorting {
    pub direction: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grouping {
    #[serde(rename = "type")]
    pub grouping_type: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub dimensions: DimensionFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionFilter {
    pub name: &'static str,
    pub operator: &'static str,
    pub values: Vec<&'static str>,
}

/// Per-kind payload shape.
struct QueryShape {
    granularity: Option<Granularity>,
    with_usd: bool,
    group_by: Option<&'static str>,
    first_party_only: bool,
    uses_timeframe: bool,
    forecast: bool,
}

fn shape(kind: ReportKind) -> QueryShape {
    match kind {
        ReportKind::DailyCost => QueryShape {
            granularity: Some(Granularity::Daily),
            with_usd: true,
            group_by: None,
            first_party_only: false,
            uses_timeframe: true,
            forecast: false,
        },
        // The forecast operation returns a single cost figure and always
        // projects forward from today, so it takes no timeframe.
        ReportKind::Forecast => QueryShape {
            granularity: Some(Granularity::Daily),
            with_usd: false,
            group_by: None,
            first_party_only: true,
            uses_timeframe: false,
            forecast: true,
        },
        ReportKind::ByService => QueryShape {
            granularity: None,
            with_usd: true,
            group_by: Some("ServiceName"),
            first_party_only: true,
            uses_timeframe: true,
            forecast: false,
        },
        ReportKind::ByLocation => QueryShape {
            granularity: None,
            with_usd: true,
            group_by: Some("ResourceLocation"),
            first_party_only: true,
            uses_timeframe: true,
            forecast: false,
        },
    }
}

/// Build the request body for one report kind.
///
/// Pure: the subscription id is not part of the body, it only selects the
/// resource path (see `CostQueryClient`).
pub fn build_query(params: &ReportParameters, kind: ReportKind) -> QueryDefinition {
    let shape = shape(kind);

    let mut aggregation = BTreeMap::new();
    aggregation.insert(
        "totalCost",
        Aggregation {
            name: "Cost",
            function: "Sum",
        },
    );
    if shape.with_usd {
        aggregation.insert(
            "totalCostUSD",
            Aggregation {
                name: "CostUSD",
                function: "Sum",
            },
        );
    }

    let grouping = shape
        .group_by
        .map(|dimension| Grouping {
            grouping_type: "Dimension",
            name: dimension,
        })
        .into_iter()
        .collect();

    let filter = shape.first_party_only.then(|| Filter {
        dimensions: DimensionFilter {
            name: "PublisherType",
            operator: "In",
            values: vec![FIRST_PARTY_PUBLISHER],
        },
    });

    let (timeframe, time_period) = if shape.uses_timeframe {
        let period = params.period();
        let time_period = period.range().map(|range| TimePeriod {
            from: range.from().format(DATE_FORMAT).to_string(),
            to: range.to().format(DATE_FORMAT).to_string(),
        });
        (Some(period.timeframe()), time_period)
    } else {
        (None, None)
    };

    QueryDefinition {
        query_type: QUERY_TYPE,
        timeframe,
        time_period,
        dataset: Dataset {
            granularity: shape.granularity,
            aggregation,
            sorting: vec![Sorting {
                direction: "ascending",
                name: SORT_KEY,
            }],
            grouping,
            filter,
        },
        include_actual_cost: shape.forecast.then_some(false),
        include_fresh_partial_cost: shape.forecast.then_some(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::params::{OutputMode, ReportPeriod, SubscriptionId};
    use chrono::NaiveDate;
    use serde_json::json;

    fn subscription() -> SubscriptionId {
        "0b9f7c3e-1a2b-4c5d-8e9f-a0b1c2d3e4f5".parse().unwrap()
    }

    fn named(timeframe: Timeframe) -> ReportParameters {
        ReportParameters::new(
            subscription(),
            ReportPeriod::named(timeframe).unwrap(),
            OutputMode::Console,
        )
    }

    fn custom(from: (i32, u32, u32), to: (i32, u32, u32)) -> ReportParameters {
        let from = NaiveDate::from_ymd_opt(from.0, from.1, from.2).unwrap();
        let to = NaiveDate::from_ymd_opt(to.0, to.1, to.2).unwrap();
        ReportParameters::new(
            subscription(),
            ReportPeriod::new(Timeframe::Custom, Some(from), Some(to)).unwrap(),
            OutputMode::Json,
        )
    }

    #[test]
    fn daily_cost_payload_for_named_timeframe() {
        let payload = serde_json::to_value(build_query(
            &named(Timeframe::MonthToDate),
            ReportKind::DailyCost,
        ))
        .unwrap();
        assert_eq!(
            payload,
            json!({
                "type": "ActualCost",
                "timeframe": "MonthToDate",
                "dataSet": {
                    "granularity": "Daily",
                    "aggregation": {
                        "totalCost": { "name": "Cost", "function": "Sum" },
                        "totalCostUSD": { "name": "CostUSD", "function": "Sum" }
                    },
                    "sorting": [{ "direction": "ascending", "name": "UsageDate" }]
                }
            })
        );
    }

    #[test]
    fn named_timeframes_never_carry_time_period() {
        let timeframes = [
            Timeframe::BillingMonthToDate,
            Timeframe::MonthToDate,
            Timeframe::TheLastBillingMonth,
            Timeframe::TheLastMonth,
            Timeframe::WeekToDate,
        ];
        for timeframe in timeframes {
            let params = named(timeframe);
            for kind in ReportKind::ALL {
                let query = build_query(&params, kind);
                assert!(query.time_period.is_none(), "{:?} / {}", timeframe, kind);
            }
        }
    }

    #[test]
    fn custom_range_is_embedded_as_iso_dates() {
        let params = custom((2024, 1, 5), (2024, 2, 29));
        for kind in [ReportKind::DailyCost, ReportKind::ByService, ReportKind::ByLocation] {
            let query = build_query(&params, kind);
            assert_eq!(query.timeframe, Some(Timeframe::Custom));
            assert_eq!(
                query.time_period,
                Some(TimePeriod {
                    from: "2024-01-05".to_string(),
                    to: "2024-02-29".to_string(),
                })
            );
        }
        let payload =
            serde_json::to_value(build_query(&params, ReportKind::DailyCost)).unwrap();
        assert_eq!(
            payload["timePeriod"],
            json!({ "from": "2024-01-05", "to": "2024-02-29" })
        );
    }

    #[test]
    fn forecast_payload_ignores_timeframe() {
        let params = custom((2024, 3, 1), (2024, 3, 31));
        let payload = serde_json::to_value(build_query(&params, ReportKind::Forecast)).unwrap();
        assert_eq!(
            payload,
            json!({
                "type": "ActualCost",
                "dataSet": {
                    "granularity": "Daily",
                    "aggregation": {
                        "totalCost": { "name": "Cost", "function": "Sum" }
                    },
                    "sorting": [{ "direction": "ascending", "name": "UsageDate" }],
                    "filter": {
                        "dimensions": {
                            "name": "PublisherType",
                            "operator": "In",
                            "values": ["azure"]
                        }
                    }
                },
                "includeActualCost": false,
                "includeFreshPartialCost": false
            })
        );
    }

    #[test]
    fn grouped_payloads_group_by_their_dimension() {
        let params = named(Timeframe::TheLastMonth);
        for (kind, dimension) in [
            (ReportKind::ByService, "ServiceName"),
            (ReportKind::ByLocation, "ResourceLocation"),
        ] {
            let payload = serde_json::to_value(build_query(&params, kind)).unwrap();
            let dataset = &payload["dataSet"];
            assert!(dataset.get("granularity").is_none());
            assert_eq!(
                dataset["grouping"],
                json!([{ "type": "Dimension", "name": dimension }])
            );
            assert_eq!(dataset["filter"]["dimensions"]["values"], json!(["azure"]));
            assert_eq!(dataset["sorting"][0]["name"], "UsageDate");
            assert!(dataset["aggregation"].get("totalCostUSD").is_some());
            assert_eq!(payload["timeframe"], "TheLastMonth");
        }
    }

    #[test]
    fn daily_cost_has_no_filter_or_grouping() {
        let query = build_query(&named(Timeframe::WeekToDate), ReportKind::DailyCost);
        assert!(query.dataset.filter.is_none());
        assert!(query.dataset.grouping.is_empty());
        assert!(query.include_actual_cost.is_none());
    }

    #[test]
    fn builder_is_deterministic() {
        let params = custom((2024, 1, 1), (2024, 1, 31));
        for kind in ReportKind::ALL {
            assert_eq!(build_query(&params, kind), build_query(&params, kind));
        }
    }
}
