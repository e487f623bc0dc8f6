use crate::commands::{run_history, run_search, run_submit, HistoryArgs, SearchArgs, SubmitArgs};
use clap::{Parser, Subcommand};
use road_report::config::AppConfig;
use road_report::error::AppError;
use road_report::telemetry;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Road Report",
    about = "File and review road issue reports from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk the report wizard with the given answers and submit the report
    Submit(SubmitArgs),
    /// List reports submitted from this installation
    History(HistoryArgs),
    /// Look up address suggestions
    Search(SearchArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    info!(
        ?config.environment,
        data_dir = %config.storage.data_dir.display(),
        "road report ready"
    );

    match cli.command {
        Command::Submit(args) => run_submit(&config, args).await,
        Command::History(args) => run_history(&config, args),
        Command::Search(args) => run_search(&config, args).await,
    }
}
