//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use crate::config::constants::{DEFAULT_USER_AGENT, REQUEST_TIMEOUT_SECS, RETRY_MAX_ATTEMPTS};
use crate::sites::Site;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line interface.
///
/// One positional picks the scraper, an optional second positional overrides
/// the output filename. Everything else tunes the shared pipeline.
#[derive(Debug, Parser)]
#[command(name = "site_scrapers")]
#[command(about = "Scrape one site and write its rows to a fully quoted CSV file")]
#[command(version)]
pub struct Cli {
    /// Site to scrape
    #[arg(value_enum)]
    pub site: Site,

    /// Output filename for scraped data (default: derived from the job name)
    pub filename: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Attempts per request before the request is dropped
    #[arg(long, default_value_t = RETRY_MAX_ATTEMPTS)]
    pub max_attempts: usize,

    /// Seconds to wait after a failed attempt (default: the site's own delay)
    #[arg(long)]
    pub retry_delay_secs: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Brand/series catalog for the Dongchedi index scraper
    #[arg(long, default_value = "brands.json")]
    pub brands_file: PathBuf,

    /// First month scraped by the BSE derivatives scraper (YYYY-MM-DD)
    #[arg(long, default_value = "2025-01-01")]
    pub since: NaiveDate,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without going through `Cli`.
///
/// # Examples
///
/// ```no_run
/// use site_scrapers::{Config, Site};
///
/// let config = Config {
///     site: Site::NycAirports,
///     max_attempts: 5,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Scraper to run
    pub site: Site,

    /// Output file (defaults to the site's job-derived path)
    pub output: Option<PathBuf>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Attempts per request, including the first one
    pub max_attempts: usize,

    /// Override for the delay after a failed attempt
    pub retry_delay: Option<Duration>,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Brand/series catalog for the Dongchedi index scraper
    pub brands_file: PathBuf,

    /// First month scraped by the BSE derivatives scraper
    pub since: NaiveDate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: Site::CesProducts,
            output: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            max_attempts: RETRY_MAX_ATTEMPTS,
            retry_delay: None,
            timeout_seconds: REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            brands_file: PathBuf::from("brands.json"),
            since: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            site: cli.site,
            output: cli.filename,
            log_level: cli.log_level,
            log_format: cli.log_format,
            max_attempts: cli.max_attempts,
            retry_delay: cli.retry_delay_secs.map(Duration::from_secs),
            timeout_seconds: cli.timeout_seconds,
            user_agent: cli.user_agent,
            brands_file: cli.brands_file,
            since: cli.since,
        }
    }
}

impl Config {
    /// Output path for this run: the explicit filename, or the site's default.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.site.default_output())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.timeout_seconds, 60);
        assert!(config.retry_delay.is_none());
        assert!(config.output.is_none());
        assert_eq!(config.since, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn test_cli_minimal_uses_defaults() {
        let cli = Cli::try_parse_from(["site_scrapers", "nyc-airports"]).unwrap();
        let config = Config::from(cli);
        assert_eq!(config.site, Site::NycAirports);
        assert!(config.output.is_none());
        assert_eq!(config.max_attempts, RETRY_MAX_ATTEMPTS);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_cli_positional_filename_and_overrides() {
        let cli = Cli::try_parse_from([
            "site_scrapers",
            "bse-derivatives",
            "out/bse.csv",
            "--max-attempts",
            "5",
            "--retry-delay-secs",
            "1",
            "--since",
            "2024-06-01",
        ])
        .unwrap();
        let config = Config::from(cli);
        assert_eq!(config.output_path(), PathBuf::from("out/bse.csv"));
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.retry_delay, Some(Duration::from_secs(1)));
        assert_eq!(config.since, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn test_cli_rejects_unknown_site() {
        assert!(Cli::try_parse_from(["site_scrapers", "no-such-site"]).is_err());
    }

    #[test]
    fn test_output_path_defaults_to_site() {
        let config = Config {
            site: Site::NycAirports,
            ..Default::default()
        };
        assert_eq!(config.output_path(), Site::NycAirports.default_output());
    }
}
