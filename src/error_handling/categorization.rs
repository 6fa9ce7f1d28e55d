//! Error categorization.
//!
//! Maps a failed request attempt onto the `ErrorType` it is counted under.

use super::stats::ProcessingStats;
use super::types::{ErrorType, FetchError};

/// Categorizes a `reqwest::Error` into an `ErrorType`.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorType {
    if error.is_timeout() {
        ErrorType::HttpRequestTimeoutError
    } else if error.is_connect() {
        ErrorType::HttpRequestConnectError
    } else if error.is_body() || error.is_decode() {
        ErrorType::HttpRequestBodyError
    } else if error.is_status() {
        ErrorType::HttpRequestStatusError
    } else {
        ErrorType::HttpRequestOtherError
    }
}

/// Categorizes one failed attempt.
pub fn categorize_fetch_error(error: &FetchError) -> ErrorType {
    match error {
        FetchError::Transport { source, .. } => categorize_reqwest_error(source),
        FetchError::Status { .. } => ErrorType::HttpRequestStatusError,
        FetchError::Body { .. } => ErrorType::HttpRequestBodyError,
    }
}

/// Records a failed attempt in the run statistics.
pub fn update_error_stats(stats: &ProcessingStats, error: &FetchError) {
    stats.increment_error(categorize_fetch_error(error));
}
