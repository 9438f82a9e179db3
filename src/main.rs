mod cli;
mod core;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::core::config::AppConfig;
use crate::core::models::params::{OutputMode, SubscriptionId, Timeframe};

#[derive(Parser)]
#[command(
    name = "azcost",
    about = "Azure subscription cost reports",
    version,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    report: ReportOpts,

    /// Output mode (default from config, else console)
    #[arg(short, long, global = true, value_enum)]
    output: Option<OutputMode>,

    /// Shorthand for --output json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct ReportOpts {
    /// Subscription id (default: config, then the Azure CLI's current account)
    #[arg(short, long)]
    subscription: Option<SubscriptionId>,

    /// Reporting timeframe
    #[arg(short, long, value_enum, default_value_t = Timeframe::MonthToDate)]
    timeframe: Timeframe,

    /// First day of a custom timeframe (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of a custom timeframe (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init {
        /// Default subscription id to store
        #[arg(short, long)]
        subscription: Option<String>,
    },
    /// Validate config file
    Check,
    /// Print the config file location
    Path,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("azcost=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { subscription } => cli::config_cmd::init(subscription)?,
            ConfigAction::Check => cli::config_cmd::check()?,
            ConfigAction::Path => cli::config_cmd::path()?,
        },
        None => {
            let config = AppConfig::load().context("Failed to load config")?;

            let output_opts = cli::output::OutputOptions {
                pretty: cli.pretty,
                use_color: cli::output::detect_color(cli.no_color, &config.settings.color),
                verbose: cli.verbose,
            };

            let args = cli::report_cmd::ReportArgs {
                subscription: cli.report.subscription,
                timeframe: cli.report.timeframe,
                from: cli.report.from,
                to: cli.report.to,
                output: if cli.json {
                    OutputMode::Json
                } else {
                    cli.output.unwrap_or_else(|| config.output_mode())
                },
            };
            cli::report_cmd::run(args, &config, &output_opts).await?;
        }
    }

    Ok(())
}
