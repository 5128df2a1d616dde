mod cli;
mod demo;
mod infra;
mod maintenance;
mod routes;
mod server;

use alumni_registry::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
