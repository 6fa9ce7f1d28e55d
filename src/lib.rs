//! site_scrapers library: single-purpose site scrapers on one shared pipeline
//!
//! Every scraper runs the same sequence: build a session, fetch pages or JSON
//! endpoints with retries, parse a fixed field set, accumulate flat row
//! records, and export them to a fully quoted CSV file.
//!
//! # Example
//!
//! ```no_run
//! use site_scrapers::{run_scrape, Config, Site};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     site: Site::NycAirports,
//!     ..Default::default()
//! };
//!
//! let report = run_scrape(config).await?;
//! println!("Wrote {} records to {}", report.records, report.output.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Requests are awaited one at a time;
//! nothing is fetched concurrently.

mod app;
pub mod config;
mod error_handling;
pub mod export;
pub mod fetch;
pub mod initialization;
pub mod parse;
pub mod record;
pub mod sites;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{
    ErrorType, ExportError, FetchError, InitializationError, ProcessingStats, SiteError,
    WarningType,
};
pub use record::{Accumulator, FieldValue, Record, RunContext};
pub use run::{run_scrape, ScrapeReport};
pub use sites::Site;

// Internal run module (contains the orchestration logic)
mod run {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use anyhow::{Context, Result};
    use log::info;

    use crate::app::{print_error_statistics, print_run_summary};
    use crate::config::{
        Config, HeaderSet, AIRPORT_HEADERS, BSE_HEADERS, CES_HEADERS, DONGCHEDI_HEADERS,
        STARTUP_PAUSE,
    };
    use crate::error_handling::{ExportError, ProcessingStats};
    use crate::export::export_csv;
    use crate::fetch::{RetryPolicy, Session, SessionConfig};
    use crate::record::RunContext;
    use crate::sites::{BseDerivatives, CesProducts, DongchediIndex, NycAirports, Site};

    /// Results of a scraping run.
    #[derive(Debug, Clone)]
    pub struct ScrapeReport {
        /// Site that was scraped
        pub site: Site,
        /// Number of records written
        pub records: usize,
        /// Path of the CSV file
        pub output: PathBuf,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Session settings for one site, with the run's overrides applied.
    fn session_config(config: &Config, headers: HeaderSet, retry: RetryPolicy) -> SessionConfig {
        let mut retry = retry.with_max_attempts(config.max_attempts);
        if let Some(delay) = config.retry_delay {
            retry = retry.with_delay(delay);
        }
        SessionConfig {
            headers,
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            retry,
        }
    }

    /// Runs one scraper end to end and writes its CSV file.
    ///
    /// # Arguments
    ///
    /// * `config` - Site, output path, retry and client settings
    ///
    /// # Returns
    ///
    /// Returns a `ScrapeReport` for the written file.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The HTTP client cannot be built
    /// - A site input (the Dongchedi brand catalog) cannot be loaded
    /// - Nothing was scraped (`ExportError::NoRecords`; no file is written)
    /// - The output file cannot be written
    pub async fn run_scrape(config: Config) -> Result<ScrapeReport> {
        let site = config.site;
        let ctx = RunContext::now();
        let stats = Arc::new(ProcessingStats::new());

        info!("STARTING SCRAPE... {}", site.job_name());
        let start_time = Instant::now();
        tokio::time::sleep(STARTUP_PAUSE).await;

        let accumulator = match site {
            Site::CesProducts => {
                let session = Session::new(
                    session_config(&config, CES_HEADERS, RetryPolicy::default()),
                    Arc::clone(&stats),
                )
                .context("Failed to initialize HTTP client")?;
                CesProducts::new().scrape(&session, &ctx).await
            }
            Site::NycAirports => {
                let session = Session::new(
                    session_config(&config, AIRPORT_HEADERS, RetryPolicy::default()),
                    Arc::clone(&stats),
                )
                .context("Failed to initialize HTTP client")?;
                NycAirports::new().scrape(&session, &ctx).await
            }
            Site::DongchediIndex => {
                let scraper = DongchediIndex::from_catalog(&config.brands_file)
                    .context("Failed to load brand catalog")?;
                let session = Session::new(
                    session_config(&config, DONGCHEDI_HEADERS, RetryPolicy::paced_default()),
                    Arc::clone(&stats),
                )
                .context("Failed to initialize HTTP client")?;
                scraper.scrape(&session, &ctx).await
            }
            Site::BseDerivatives => {
                let session = Session::with_cookies(
                    session_config(&config, BSE_HEADERS, RetryPolicy::paced_default()),
                    Arc::clone(&stats),
                )
                .context("Failed to initialize HTTP client")?;
                BseDerivatives::new(config.since).scrape(&session, &ctx).await
            }
        };

        info!("GENERATING FINAL OUTPUT...");
        let output = config.output_path();
        let written = export_csv(accumulator.as_slice(), site.columns(), &output);
        print_error_statistics(&stats);

        let records = match written {
            Ok(records) => records,
            Err(ExportError::NoRecords) => return Err(ExportError::NoRecords.into()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to write {}", output.display()))
            }
        };

        let elapsed_seconds = start_time.elapsed().as_secs_f64();
        print_run_summary(site, records, elapsed_seconds);

        Ok(ScrapeReport {
            site,
            records,
            output,
            elapsed_seconds,
        })
    }

}
