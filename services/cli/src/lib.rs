mod cli;
mod commands;
mod infra;

use eventos_meta::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
