use crate::commands::{run_export_csv, run_rank, run_report, run_validate};
use crate::infra::{parse_date, parse_points};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use eventos_meta::config::AppConfig;
use eventos_meta::error::AppError;
use eventos_meta::telemetry;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "eventos-meta",
    about = "Rank MetaReciclagem event applicants and export classification reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recompute scores, positions and statuses for an event
    Rank(RankArgs),
    /// Rank an event and print the classification summary
    Report(ReportArgs),
    /// Rank an event and export the ranked list as CSV
    ExportCsv(ExportArgs),
    /// Record an operator grant for a custom criterion
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
pub(crate) struct DatasetArgs {
    /// JSON dataset to load (defaults to EVENTOS_DATASET)
    #[arg(long)]
    pub(crate) dataset: Option<PathBuf>,
    /// Override the date used for age computation (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    #[command(flatten)]
    pub(crate) dataset: DatasetArgs,
    /// Event to rank
    #[arg(long)]
    pub(crate) event: u64,
    /// Write the updated dataset to this path
    #[arg(long)]
    pub(crate) save: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    #[command(flatten)]
    pub(crate) dataset: DatasetArgs,
    /// Event to report on
    #[arg(long)]
    pub(crate) event: u64,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    #[command(flatten)]
    pub(crate) dataset: DatasetArgs,
    /// Event to export
    #[arg(long)]
    pub(crate) event: u64,
    /// CSV destination (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    #[command(flatten)]
    pub(crate) dataset: DatasetArgs,
    /// Registration receiving the grant
    #[arg(long)]
    pub(crate) registration: u64,
    /// Custom criterion being validated
    #[arg(long)]
    pub(crate) criterion: u64,
    /// Base points granted, between 0 and 100
    #[arg(long, value_parser = parse_points)]
    pub(crate) points: Decimal,
    /// Name of the operator validating the criterion
    #[arg(long)]
    pub(crate) validator: String,
    /// Write the updated dataset to this path
    #[arg(long)]
    pub(crate) save: Option<PathBuf>,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    match cli.command {
        Command::Rank(args) => run_rank(&config, args),
        Command::Report(args) => run_report(&config, args),
        Command::ExportCsv(args) => run_export_csv(&config, args),
        Command::Validate(args) => run_validate(&config, args),
    }
}
