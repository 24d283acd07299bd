use clap::Parser;
use gridpool::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match cli::load_and_merge_config(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    let logger = match cli::init_logger_from_settings(&settings) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Logger initialization error: {}", e);
            std::process::exit(2);
        }
    };

    let result = cli::execute_command(&cli, settings).await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
    }
    logger.flush();

    if result.is_err() {
        std::process::exit(1);
    }
}
