mod agent;
mod cli;
mod seed;

use socium_kpi::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
