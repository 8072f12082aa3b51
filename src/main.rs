mod app;
mod config;
mod domain;
mod logging;
mod message;
mod pushplus;
mod schedule;
mod storage;

use std::process::ExitCode;

use clap::Parser;
use config::{Cli, Config};
use tracing::{error, info};

fn main() -> ExitCode {
    // A missing .env is normal outside local development.
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    logging::init(cli.log_format);
    info!(version = env!("CARGO_PKG_VERSION"), "macro reminder starting");

    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match app::run(&config) {
        Ok(outcome) => {
            info!(?outcome, "macro reminder finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "macro reminder failed");
            ExitCode::FAILURE
        }
    }
}
