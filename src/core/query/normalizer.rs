use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

use crate::core::error::CostError;
use crate::core::models::cost::{CostItem, CostNamedItem};
use crate::core::query::ReportKind;

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub properties: QueryProperties,
}

#[derive(Debug, Deserialize)]
pub struct QueryProperties {
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

/// Column positions of one report kind's rows.
///
/// `key` holds the usage date for time series and the group label for
/// grouped kinds.
#[derive(Debug, Clone, Copy)]
struct RowLayout {
    cost: usize,
    cost_usd: usize,
    key: usize,
    currency: usize,
}

impl RowLayout {
    fn width(&self) -> usize {
        [self.cost, self.cost_usd, self.key, self.currency]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

fn layout(kind: ReportKind) -> RowLayout {
    match kind {
        // [Cost, CostUSD, UsageDate, Currency]
        ReportKind::DailyCost => RowLayout {
            cost: 0,
            cost_usd: 1,
            key: 2,
            currency: 3,
        },
        // [Cost, UsageDate, CostStatus, Currency]; one cost figure fills both amounts
        ReportKind::Forecast => RowLayout {
            cost: 0,
            cost_usd: 0,
            key: 1,
            currency: 3,
        },
        // [Cost, CostUSD, ServiceName | ResourceLocation, Currency]
        ReportKind::ByService | ReportKind::ByLocation => RowLayout {
            cost: 0,
            cost_usd: 1,
            key: 2,
            currency: 3,
        },
    }
}

/// Decode the `{ properties: { rows } }` envelope of a query response.
pub fn extract_rows(kind: ReportKind, body: &str) -> Result<Vec<Vec<Value>>, CostError> {
    let response: QueryResponse = serde_json::from_str(body).map_err(|e| {
        CostError::normalization(kind, 0, format!("unexpected response shape: {}", e))
    })?;
    Ok(response.properties.rows)
}

/// Normalize time-series rows (daily cost or forecast) into [`CostItem`]s.
pub fn normalize_cost_items(
    kind: ReportKind,
    rows: &[Vec<Value>],
) -> Result<Vec<CostItem>, CostError> {
    if !matches!(kind, ReportKind::DailyCost | ReportKind::Forecast) {
        return Err(CostError::normalization(
            kind,
            0,
            "rows are not a time series",
        ));
    }
    let layout = layout(kind);
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let fields = RowFields::read(kind, layout, index, row)?;
            let date = parse_date(&row[layout.key])
                .map_err(|reason| CostError::normalization(kind, index, reason))?;
            Ok(CostItem {
                date,
                amount: fields.cost,
                amount_usd: fields.cost_usd,
                currency: fields.currency,
            })
        })
        .collect()
}

/// Normalize grouped rows (by service or by location) into [`CostNamedItem`]s.
pub fn normalize_named_items(
    kind: ReportKind,
    rows: &[Vec<Value>],
) -> Result<Vec<CostNamedItem>, CostError> {
    if !matches!(kind, ReportKind::ByService | ReportKind::ByLocation) {
        return Err(CostError::normalization(kind, 0, "rows are not grouped"));
    }
    let layout = layout(kind);
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let fields = RowFields::read(kind, layout, index, row)?;
            let name = parse_label(&row[layout.key])
                .map_err(|reason| CostError::normalization(kind, index, reason))?;
            Ok(CostNamedItem {
                name,
                amount: fields.cost,
                amount_usd: fields.cost_usd,
                currency: fields.currency,
            })
        })
        .collect()
}

/// Columns shared by every layout.
struct RowFields {
    cost: Decimal,
    cost_usd: Decimal,
    currency: String,
}

impl RowFields {
    fn read(
        kind: ReportKind,
        layout: RowLayout,
        index: usize,
        row: &[Value],
    ) -> Result<Self, CostError> {
        if row.len() < layout.width() {
            return Err(CostError::normalization(
                kind,
                index,
                format!(
                    "expected at least {} columns, got {}",
                    layout.width(),
                    row.len()
                ),
            ));
        }
        let err = |reason: String| CostError::normalization(kind, index, reason);
        Ok(Self {
            cost: parse_amount(&row[layout.cost]).map_err(err)?,
            cost_usd: parse_amount(&row[layout.cost_usd]).map_err(err)?,
            currency: parse_label(&row[layout.currency]).map_err(err)?,
        })
    }
}

/// Text form of a scalar cell; numbers keep their JSON spelling.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a cost figure with invariant formatting: `.` as decimal point, no
/// grouping separators, optional exponent.
fn parse_amount(value: &Value) -> Result<Decimal, String> {
    let text = scalar_text(value)
        .filter(|text| is_invariant_number(text))
        .ok_or_else(|| format!("cost is not a number: {}", value))?;
    let parsed = if text.contains(['e', 'E']) {
        Decimal::from_scientific(&text)
    } else {
        Decimal::from_str(&text)
    };
    parsed.map_err(|_| format!("cost is not a number: {}", value))
}

/// `-?digits[.digits][(e|E)[+-]digits]`; rejects signs, spaces and separators
/// that `Decimal::from_str` would otherwise let through.
fn is_invariant_number(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
        None => (unsigned, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok =
        !(int_part.is_empty() && frac_part.is_empty()) && digits(int_part) && digits(frac_part);
    let exponent_ok = exponent.map_or(true, |exp| {
        let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        !exp.is_empty() && digits(exp)
    });
    mantissa_ok && exponent_ok
}

/// Parse an eight-digit `yyyyMMdd` usage date.
fn parse_date(value: &Value) -> Result<NaiveDate, String> {
    let text = scalar_text(value).ok_or_else(|| format!("bad date token: {}", value))?;
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("bad date token: {}", value));
    }
    let year: i32 = text[0..4].parse().map_err(|_| format!("bad date token: {}", text))?;
    let month: u32 = text[4..6].parse().map_err(|_| format!("bad date token: {}", text))?;
    let day: u32 = text[6..8].parse().map_err(|_| format!("bad date token: {}", text))?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| format!("bad date token: {}", text))
}

fn parse_label(value: &Value) -> Result<String, String> {
    scalar_text(value).ok_or_else(|| format!("expected a text column, got {}", value))
}
