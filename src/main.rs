//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `site_scrapers` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file, e.g. proxy settings)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use site_scrapers::config::Cli;
use site_scrapers::initialization::init_logger_with;
use site_scrapers::{run_scrape, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Proxy variables (HTTPS_PROXY, ...) may live in a .env file
    let _ = dotenvy::dotenv();

    let config = Config::from(Cli::parse());

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_scrape(config).await {
        Ok(report) => {
            println!(
                "✅ Wrote {} record{} to {} in {:.1}s",
                report.records,
                if report.records == 1 { "" } else { "s" },
                report.output.display(),
                report.elapsed_seconds
            );
            log::info!("ALL DONE");
            Ok(())
        }
        Err(e) => {
            eprintln!("site_scrapers error: {:#}", e);
            process::exit(1);
        }
    }
}
