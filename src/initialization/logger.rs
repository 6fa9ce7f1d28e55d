//! Logger setup: colored lines for terminals, JSON lines for log shippers.

use std::io::{self, Write};

use colored::{ColoredString, Colorize};
use env_logger::fmt::Formatter;
use log::{Level, LevelFilter, Record};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Dependencies that are chatty at debug level.
const QUIET_MODULES: &[(&str, LevelFilter)] = &[
    ("html5ever", LevelFilter::Error),
    ("selectors", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
];

/// Installs the global logger.
///
/// `RUST_LOG` is read first; `level` then applies to this crate and as the
/// default for everything else.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, cap) in QUIET_MODULES {
        builder.filter_module(module, *cap);
    }
    builder.filter_module("site_scrapers", level);

    match format {
        LogFormat::Json => builder.format(json_line),
        LogFormat::Plain => builder.format(plain_line),
    };

    builder.try_init().map_err(InitializationError::from)?;
    Ok(())
}

/// `{"ts":<ms>,"level":..,"target":..,"msg":..}`
fn json_line(buf: &mut Formatter, record: &Record<'_>) -> io::Result<()> {
    let msg = serde_json::to_string(&record.args().to_string())
        .unwrap_or_else(|_| "\"\"".into());
    writeln!(
        buf,
        "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
        chrono::Utc::now().timestamp_millis(),
        record.level(),
        record.target(),
        msg
    )
}

fn plain_line(buf: &mut Formatter, record: &Record<'_>) -> io::Result<()> {
    let (marker, label) = level_style(record.level());
    writeln!(
        buf,
        "{} {} {} [{}] {}",
        marker,
        chrono::Local::now().format("%d-%b-%y %H:%M:%S"),
        record.target().cyan(),
        label,
        record.args()
    )
}

fn level_style(level: Level) -> (&'static str, ColoredString) {
    let name = level.to_string();
    match level {
        Level::Error => ("❌", name.red()),
        Level::Warn => ("⚠️", name.yellow()),
        Level::Info => ("✔️", name.green()),
        Level::Debug => ("🔍", name.blue()),
        Level::Trace => ("🔬", name.purple()),
    }
}
