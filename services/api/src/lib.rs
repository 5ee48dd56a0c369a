mod cli;
mod infra;
mod routes;
mod scoring;
mod server;

use mortgage_rating::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
