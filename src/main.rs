// cropwater - main.rs
// Loads configuration, installs logging, and dispatches the CLI.

use clap::Parser;
use cropwater::cli::{dispatch, resolve_config, Cli};
use cropwater::config::LogConfig;
use cropwater::telemetry;
use std::process::exit;

fn main() {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            telemetry::init(&LogConfig::default());
            tracing::error!("{e:#}");
            eprintln!("Failed to load config: {e:#}");
            exit(1);
        }
    };

    telemetry::init(&config.log);

    if let Err(e) = dispatch(cli, config) {
        eprintln!("Error: {e:#}");
        exit(1);
    }
}
