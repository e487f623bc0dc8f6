mod cli;
mod commands;
mod infra;

use road_report::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
