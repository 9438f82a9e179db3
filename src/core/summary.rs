use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::models::cost::{CostItem, ReportBundle};

/// A cost figure in the billing currency and in USD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Amount {
    pub native: Decimal,
    pub usd: Decimal,
}

impl Amount {
    fn accumulate(&mut self, item: &CostItem) {
        self.native += item.amount;
        self.usd += item.amount_usd;
    }
}

/// Accumulated figures shown above the detailed tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostTotals {
    pub currency: String,
    pub today: Amount,
    pub yesterday: Amount,
    pub last_7_days: Amount,
    pub last_30_days: Amount,
    /// Everything in the reported period
    pub period: Amount,
    /// Forecasted cost for the days after `today`
    pub forecast: Amount,
}

fn sum_where(items: &[CostItem], keep: impl Fn(NaiveDate) -> bool) -> Amount {
    items
        .iter()
        .filter(|item| keep(item.date))
        .fold(Amount::default(), |mut acc, item| {
            acc.accumulate(item);
            acc
        })
}

/// Compute totals relative to `today`. Windows include `today` itself.
pub fn compute_totals(bundle: &ReportBundle, today: NaiveDate) -> CostTotals {
    let daily = bundle.daily_costs();
    let yesterday = today - Duration::days(1);
    let week_start = today - Duration::days(6);
    let month_start = today - Duration::days(29);

    let currency = daily
        .first()
        .or_else(|| bundle.forecasted_costs().first())
        .map(|item| item.currency.clone())
        .unwrap_or_default();

    CostTotals {
        currency,
        today: sum_where(daily, |d| d == today),
        yesterday: sum_where(daily, |d| d == yesterday),
        last_7_days: sum_where(daily, |d| d >= week_start && d <= today),
        last_30_days: sum_where(daily, |d| d >= month_start && d <= today),
        period: sum_where(daily, |_| true),
        forecast: sum_where(bundle.forecasted_costs(), |d| d > today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(date: NaiveDate, amount: &str, usd: &str) -> CostItem {
        CostItem {
            date,
            amount: Decimal::from_str(amount).unwrap(),
            amount_usd: Decimal::from_str(usd).unwrap(),
            currency: "EUR".to_string(),
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn bundle() -> ReportBundle {
        let daily = (1..=31)
            .map(|d| item(date(2024, 1, d), "1.50", "1.60"))
            .collect();
        let forecast = vec![
            item(date(2024, 1, 31), "9", "9"),
            item(date(2024, 2, 1), "2", "2"),
            item(date(2024, 2, 2), "3", "3"),
        ];
        ReportBundle::new(daily, forecast, vec![], vec![])
    }

    #[test]
    fn totals_windows() {
        let totals = compute_totals(&bundle(), date(2024, 1, 31));
        assert_eq!(totals.currency, "EUR");
        assert_eq!(totals.today.native, dec("1.50"));
        assert_eq!(totals.yesterday.usd, dec("1.60"));
        assert_eq!(totals.last_7_days.native, dec("10.50"));
        assert_eq!(totals.last_30_days.native, dec("45.00"));
        assert_eq!(totals.period.native, dec("46.50"));
        assert_eq!(totals.period.usd, dec("49.60"));
    }

    #[test]
    fn forecast_counts_only_future_days() {
        let totals = compute_totals(&bundle(), date(2024, 1, 31));
        assert_eq!(totals.forecast.native, dec("5"));
    }

    #[test]
    fn windows_exclude_days_after_today() {
        let totals = compute_totals(&bundle(), date(2024, 1, 10));
        assert_eq!(totals.last_7_days.native, dec("10.50"));
        assert_eq!(totals.last_30_days.native, dec("15.00"));
        assert_eq!(totals.period.native, dec("46.50"));
    }

    #[test]
    fn empty_bundle_gives_zero_totals() {
        let totals = compute_totals(
            &ReportBundle::new(vec![], vec![], vec![], vec![]),
            date(2024, 1, 1),
        );
        assert_eq!(totals.currency, "");
        assert_eq!(totals.period, Amount::default());
        assert_eq!(totals.forecast, Amount::default());
    }
}
