mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use lingua_mastery::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
