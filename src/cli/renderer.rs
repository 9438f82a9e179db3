use anyhow::Result;
use chrono::NaiveDate;
use colored::{control, Colorize};
use std::io::Write;

use crate::cli::json_renderer::JsonRenderer;
use crate::cli::output::OutputOptions;
use crate::core::formatter::{format_amount, format_share_bar, share_percent};
use crate::core::models::cost::{CostItem, CostNamedItem, ReportBundle};
use crate::core::models::params::{OutputMode, ReportParameters};
use crate::core::summary::{compute_totals, Amount};

const BAR_WIDTH: usize = 12;
const MAX_NAME_WIDTH: usize = 32;

/// Presents a finished report.
pub trait Renderer {
    fn render(
        &self,
        params: &ReportParameters,
        report: ReportBundle,
        out: &mut dyn Write,
    ) -> Result<()>;
}

/// Select the renderer for the output mode carried by `params`.
pub fn renderer_for(
    params: &ReportParameters,
    opts: &OutputOptions,
    today: NaiveDate,
) -> Box<dyn Renderer> {
    match params.output() {
        OutputMode::Console => Box::new(ConsoleRenderer {
            use_color: opts.use_color,
            today,
        }),
        OutputMode::Json => Box::new(JsonRenderer {
            pretty: opts.pretty,
            today,
        }),
    }
}

/// Human-readable tables.
///
/// Layout:
/// ```text
///  Azure cost report
///   Subscription  6f1f0f6a-3b1c-4a3e-9c55-2f0b8a1d9e01
///   Period        Month to date
///
///  Totals
///   Today         12.40 EUR     (13.10 USD)
///   ...
///
///  By service
///   Virtual Machines   310.00 EUR  [████████░░░░]  71%
/// ```
pub struct ConsoleRenderer {
    pub use_color: bool,
    pub today: NaiveDate,
}

impl Renderer for ConsoleRenderer {
    fn render(
        &self,
        params: &ReportParameters,
        report: ReportBundle,
        out: &mut dyn Write,
    ) -> Result<()> {
        control::set_override(self.use_color);

        let mut lines: Vec<String> = Vec::new();
        render_header(&mut lines, params);

        let totals = compute_totals(&report, self.today);
        lines.push(String::new());
        lines.push(" Totals".bold().to_string());
        let rows: [(&str, Amount); 6] = [
            ("Today", totals.today),
            ("Yesterday", totals.yesterday),
            ("Last 7 days", totals.last_7_days),
            ("Last 30 days", totals.last_30_days),
            ("Period", totals.period),
            ("Forecast", totals.forecast),
        ];
        for (label, amount) in rows {
            lines.push(format!(
                "  {}  {:>16}  {}",
                format!("{:<12}", label).cyan(),
                format_amount(amount.native, &totals.currency),
                format!("({})", format_amount(amount.usd, "USD")).dimmed()
            ));
        }

        render_daily(&mut lines, "Daily costs", report.daily_costs(), true);
        render_daily(&mut lines, "Forecast", report.forecasted_costs(), false);
        render_grouped(&mut lines, "By service", report.costs_by_service());
        render_grouped(&mut lines, "By location", report.costs_by_location());

        writeln!(out, "{}", lines.join("\n"))?;
        Ok(())
    }
}

fn render_header(lines: &mut Vec<String>, params: &ReportParameters) {
    lines.push(" Azure cost report".bold().to_string());
    lines.push(format!(
        "  {}  {}",
        "Subscription".cyan(),
        params.subscription_id()
    ));
    let period = params.period();
    let period_str = match period.range() {
        Some(range) => format!("{} .. {}", range.from(), range.to()),
        None => period.timeframe().to_string(),
    };
    lines.push(format!("  {}        {}", "Period".cyan(), period_str));
}

fn render_daily(lines: &mut Vec<String>, title: &str, items: &[CostItem], with_usd: bool) {
    lines.push(String::new());
    lines.push(format!(" {}", title).bold().to_string());
    if items.is_empty() {
        lines.push(format!("  {}", "(no data)".dimmed()));
        return;
    }
    for item in items {
        let mut line = format!(
            "  {}  {:>16}",
            item.date.format("%Y-%m-%d").to_string().cyan(),
            format_amount(item.amount, &item.currency)
        );
        if with_usd {
            line.push_str(&format!(
                "  {}",
                format!("({})", format_amount(item.amount_usd, "USD")).dimmed()
            ));
        }
        lines.push(line);
    }
}

fn render_grouped(lines: &mut Vec<String>, title: &str, items: &[CostNamedItem]) {
    lines.push(String::new());
    lines.push(format!(" {}", title).bold().to_string());
    if items.is_empty() {
        lines.push(format!("  {}", "(no data)".dimmed()));
        return;
    }

    let total = items.iter().map(|i| i.amount).sum();
    let name_width = items
        .iter()
        .map(|i| i.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_NAME_WIDTH);

    // Largest first; the API sorts grouped rows by a date they don't have
    let mut sorted: Vec<&CostNamedItem> = items.iter().collect();
    sorted.sort_by(|a, b| b.amount.cmp(&a.amount));

    for item in sorted {
        let name: String = if item.name.is_empty() {
            "(unassigned)".to_string()
        } else {
            item.name.chars().take(MAX_NAME_WIDTH).collect()
        };
        let percent = share_percent(item.amount, total);
        lines.push(format!(
            "  {}  {:>16}  {} {:>3.0}%",
            format!("{:<width$}", name, width = name_width).cyan(),
            format_amount(item.amount, &item.currency),
            format_share_bar(percent, BAR_WIDTH).magenta(),
            percent
        ));
    }
}
