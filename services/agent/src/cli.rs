use crate::agent::{self, RunArgs};
use crate::seed::{self, SeedArgs};
use clap::{Parser, Subcommand};
use socium_kpi::config::AppConfig;
use socium_kpi::error::AppError;
use socium_kpi::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "socium-agent",
    about = "Publish Socium HR KPIs from MongoDB to Datadog",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract every KPI once and submit it as a gauge (default command)
    Run(RunArgs),
    /// Replace the store's HR collections with synthetic records
    Seed(SeedArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Run(RunArgs::default()));

    match command {
        Command::Run(args) => agent::run(&config, args),
        Command::Seed(args) => seed::run(&config, args),
    }
}
