use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Returns "123.45 EUR"; amounts are rounded half away from zero to cents.
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if currency.is_empty() {
        format!("{:.2}", rounded)
    } else {
        format!("{:.2} {}", rounded, currency)
    }
}

/// Share of `part` in `total` as a percentage in 0.0..=100.0.
pub fn share_percent(part: Decimal, total: Decimal) -> f64 {
    if total <= Decimal::ZERO {
        return 0.0;
    }
    let ratio = (part / total).to_f64().unwrap_or(0.0);
    (ratio * 100.0).clamp(0.0, 100.0)
}

/// Returns "[████░░░░░░░░]" where █ = share of the total.
/// Width is the number of block characters inside the brackets.
pub fn format_share_bar(percent: f64, width: usize) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled_blocks = ((percent / 100.0) * width as f64).round() as usize;
    let empty_blocks = width.saturating_sub(filled_blocks);

    format!("[{}{}]", "█".repeat(filled_blocks), "░".repeat(empty_blocks))
}
