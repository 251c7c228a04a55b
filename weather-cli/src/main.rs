//! Binary crate for the `weather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::EnvFilter;
use weather_core::WeatherView;

mod cli;
mod view;

#[tokio::main]
async fn main() {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);

    if let Err(err) = cmd.run().await {
        tracing::debug!(error = ?err, "command failed");
        if let Err(io_err) = view::TextView::new(std::io::stderr()).show_error(&format!("{err:#}")) {
            tracing::error!(%io_err, "failed to report error");
        }
        std::process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "weather_core=debug,weather=debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}
