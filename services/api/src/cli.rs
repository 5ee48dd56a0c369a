use crate::scoring::{run_batch, run_rate, BatchArgs, RateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mortgage_rating::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Mortgage Credit Rating",
    about = "Rate mortgage applications and serve the rating API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rate a single application without storing it
    Rate(RateArgs),
    /// Rate every row of a CSV export against the rest of the file
    Batch(BatchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Persist records to this JSON snapshot instead of memory only
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rate(args) => {
            run_rate(args);
            Ok(())
        }
        Command::Batch(args) => run_batch(args),
    }
}
