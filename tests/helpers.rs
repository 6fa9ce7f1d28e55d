// Shared test helpers for mock servers, sessions and CSV output.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use httptest::Server;
use site_scrapers::config::HeaderSet;
use site_scrapers::fetch::{RetryPolicy, Session, SessionConfig};
use site_scrapers::ProcessingStats;
use url::Url;

/// Session with no retry delay and a short timeout, reporting into fresh stats.
#[allow(dead_code)] // Used by other test files
pub fn instant_session(headers: HeaderSet, max_attempts: usize) -> (Session, Arc<ProcessingStats>) {
    let stats = Arc::new(ProcessingStats::new());
    let config = SessionConfig {
        timeout: Duration::from_secs(5),
        retry: RetryPolicy::fixed(max_attempts, Duration::ZERO),
        ..SessionConfig::for_headers(headers)
    };
    let session = Session::new(config, Arc::clone(&stats)).expect("Failed to build test session");
    (session, stats)
}

/// Like `instant_session`, with a cookie store.
#[allow(dead_code)] // Used by other test files
pub fn instant_cookie_session(headers: HeaderSet) -> (Session, Arc<ProcessingStats>) {
    let stats = Arc::new(ProcessingStats::new());
    let config = SessionConfig {
        timeout: Duration::from_secs(5),
        retry: RetryPolicy::fixed(1, Duration::ZERO),
        ..SessionConfig::for_headers(headers)
    };
    let session =
        Session::with_cookies(config, Arc::clone(&stats)).expect("Failed to build test session");
    (session, stats)
}

/// Base URL of a mock server, for use as a scraper origin.
#[allow(dead_code)] // Used by other test files
pub fn server_origin(server: &Server) -> Url {
    Url::parse(&server.url("/").to_string()).expect("mock server URL should parse")
}

/// All rows of a CSV file, header included.
#[allow(dead_code)] // Used by other test files
pub fn read_csv_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("Failed to open CSV output");
    reader
        .records()
        .map(|r| {
            r.expect("Failed to read CSV row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}
