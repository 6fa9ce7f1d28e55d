//! Configuration constants.
//!
//! This module defines the operational constants shared by every scraper:
//! retry limits, delays, request timeouts and the sentinel strings written
//! when a field cannot be extracted.

use std::time::Duration;

// Retry strategy
/// Maximum number of attempts per request (including the initial attempt).
/// Set to 3 = initial attempt + 2 retries.
pub const RETRY_MAX_ATTEMPTS: usize = 3;
/// Delay after a failed attempt for sites that are not paced.
pub const RETRY_FIXED_DELAY: Duration = Duration::from_secs(10);
/// Delay after a failed attempt for sites that are paced between requests.
pub const RETRY_PACED_DELAY: Duration = Duration::from_secs(5);
/// Lower bound of the jittered pause taken before every paced request.
pub const PACING_MIN: Duration = Duration::from_millis(1500);
/// Upper bound of the jittered pause taken before every paced request.
pub const PACING_MAX: Duration = Duration::from_millis(2500);

// Network operation timeouts
/// Per-request timeout in seconds for page and data fetches.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;
/// Per-request timeout in seconds for small lookup calls.
pub const LOOKUP_TIMEOUT_SECS: u64 = 30;
/// Pause after announcing the run, before the first request goes out.
pub const STARTUP_PAUSE: Duration = Duration::from_secs(2);

/// Default User-Agent string for HTTP requests.
///
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";

/// Suffix appended to every default output filename.
pub const OUTPUT_SUFFIX: &str = "-data.csv";

// Sentinel values
/// Generic placeholder for a value that is absent or failed to load.
pub const SENTINEL_NA: &str = "N/A";
/// Placeholder for JSON fields missing from an API item.
pub const SENTINEL_UNKNOWN: &str = "Unknown";
/// Placeholder for a missing product title.
pub const SENTINEL_NO_TITLE: &str = "No Title";
/// Placeholder for a missing product link.
pub const SENTINEL_NO_URL: &str = "No URL";

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_OK: u16 = 200;
