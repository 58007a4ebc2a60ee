// src/main.rs
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use pallet_calc::config::AppConfig;
use pallet_calc::{api, logging, report};

#[derive(Parser)]
#[command(name = "pallet-calc")]
#[command(about = "Calculate pallet requirements and shipping volumes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API and web form (default)
    Serve,

    /// Print a pallet report for a JSON shipment document
    Report {
        /// Path to the JSON file describing the shipment (use '-' for stdin)
        input: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_result = dotenvy::dotenv();
    logging::init();
    if let Err(err) = dotenv_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("⚠️ Could not load .env: {}", err);
        }
    }

    let cli = Cli::parse();
    let app_config = AppConfig::from_env();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!("🚀 Pallet calculator starting...");
            match api::start_api_server(app_config.api, app_config.calculator).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    error!("❌ API server terminated with an error: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Report { input } => {
            let calculation = app_config.calculator.calculation_config();
            match report::run_report(&input, &calculation) {
                Ok(text) => {
                    print!("{text}");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
