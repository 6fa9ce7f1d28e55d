//! HTTP client initialization.
//!
//! Builds the `reqwest::Client` behind a scraping session: the site's fixed
//! header set, a User-Agent and a per-request timeout. Connection pooling is
//! left at the transport defaults.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::ClientBuilder;

use crate::config::HeaderSet;
use crate::error_handling::InitializationError;

/// Converts a static header set into a `HeaderMap`.
///
/// # Errors
///
/// Returns `InitializationError::HeaderError` naming the first header whose
/// name or value is not valid HTTP.
pub fn build_default_headers(headers: HeaderSet) -> Result<HeaderMap, InitializationError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| InitializationError::HeaderError((*name).to_string()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| InitializationError::HeaderError((*name).to_string()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Initializes an HTTP client with a fixed header set.
///
/// # Arguments
///
/// * `headers` - Default headers sent with every request
/// * `user_agent` - User-Agent header value
/// * `timeout` - Per-request deadline
///
/// # Errors
///
/// Returns an error if a header is invalid or the client cannot be built.
pub fn init_client(
    headers: HeaderSet,
    user_agent: &str,
    timeout: Duration,
) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .default_headers(build_default_headers(headers)?)
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    Ok(client)
}
