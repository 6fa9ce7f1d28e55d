//! Error type definitions.
//!
//! This module defines the library error enums and the error/warning
//! categories counted while a scrape runs.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// A default header name or value could not be encoded.
    #[error("Invalid default header '{0}'")]
    HeaderError(String),
}

/// A single request attempt that did not produce a usable body.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request never got a response (connect, timeout, TLS, ...).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// The server answered with something other than 200 OK.
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response arrived but its body could not be read.
    #[error("reading body from {url} failed: {source}")]
    Body {
        url: String,
        #[source]
        source: ReqwestError,
    },
}

/// Error types for CSV export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Nothing was scraped; no file is written.
    #[error("no data scraped")]
    NoRecords,

    /// Creating the output directory or file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Problems with a scraper's local inputs (not network failures).
#[derive(Error, Debug)]
pub enum SiteError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not valid JSON of the expected shape.
    #[error("failed to parse catalog {path}: {source}")]
    CatalogFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Types of errors counted during a scrape.
///
/// None of these stop the run; they are absorbed and summarized at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // HTTP/Network errors (per attempt)
    HttpRequestTimeoutError,
    HttpRequestConnectError,
    HttpRequestOtherError,
    HttpRequestStatusError,
    HttpRequestBodyError,
    // Request given up after all attempts
    RequestDropped,
    // Data errors
    InvalidJson,
    SeriesLengthMismatch,
}

/// Types of warnings counted during a scrape.
///
/// Warnings mark data that was missing or unusable but did not fail the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    SentinelSubstituted, // A field fell back to its placeholder value
    ItemSkipped,         // An item could not be turned into a record
    EmptyResult,         // A page or endpoint carried no data
    MissingDataTable,    // Expected results table was absent
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::HttpRequestTimeoutError => "HTTP request timeout error",
            ErrorType::HttpRequestConnectError => "HTTP request connect error",
            ErrorType::HttpRequestOtherError => "HTTP request other error",
            ErrorType::HttpRequestStatusError => "HTTP non-200 status",
            ErrorType::HttpRequestBodyError => "HTTP request body error",
            ErrorType::RequestDropped => "Request dropped after retries",
            ErrorType::InvalidJson => "Invalid JSON response",
            ErrorType::SeriesLengthMismatch => "Date/value length mismatch",
        }
    }
}

impl std::fmt::Display for WarningType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::SentinelSubstituted => "Field replaced by placeholder",
            WarningType::ItemSkipped => "Item skipped",
            WarningType::EmptyResult => "Empty result",
            WarningType::MissingDataTable => "Missing data table",
        }
    }
}
