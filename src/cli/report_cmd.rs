use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::time::Duration;

use crate::cli::output::OutputOptions;
use crate::cli::renderer;
use crate::core::assembler::assemble_report;
use crate::core::auth;
use crate::core::client::{CostQueryClient, HttpTransport};
use crate::core::config::AppConfig;
use crate::core::models::params::{
    OutputMode, ReportParameters, ReportPeriod, SubscriptionId, Timeframe,
};
use crate::core::subscription::{resolve_subscription, AzCliSubscription};

/// Report selection as given on the command line.
pub struct ReportArgs {
    pub subscription: Option<SubscriptionId>,
    pub timeframe: Timeframe,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub output: OutputMode,
}

pub async fn run(args: ReportArgs, config: &AppConfig, opts: &OutputOptions) -> Result<()> {
    // Reject bad date ranges before touching the CLI session or the network
    let period = ReportPeriod::new(args.timeframe, args.from, args.to)?;

    let subscription = resolve_subscription(
        args.subscription,
        config.azure.subscription_id.as_deref(),
        &AzCliSubscription,
    )
    .await?;
    let params = ReportParameters::new(subscription, period, args.output);

    let token = auth::default_token_source()
        .access_token()
        .await
        .context("Failed to acquire an Azure access token")?;
    let transport = HttpTransport::new(
        &config.azure.endpoint,
        token,
        Duration::from_secs(config.azure.timeout_secs),
    )?;
    let client = CostQueryClient::new(transport, config.azure.api_version.as_str());

    // Show spinner on stderr (console mode only, and not interleaved with logs)
    let spinner = if matches!(params.output(), OutputMode::Console) && !opts.verbose {
        Some(tokio::spawn(async move {
            let frames = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
            let mut i = 0usize;
            loop {
                eprint!("\r {} Fetching cost data...", frames[i % frames.len()]);
                i = i.wrapping_add(1);
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
        }))
    } else {
        None
    };

    let result = assemble_report(&client, &params).await;

    // Stop spinner and clear the line
    if let Some(s) = spinner {
        s.abort();
        eprint!("\r\x1b[2K");
    }

    let report = result.context("Failed to retrieve cost report")?;

    let today = Local::now().date_naive();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    renderer::renderer_for(&params, opts, today).render(&params, report, &mut out)?;
    Ok(())
}
