//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (retry limits, timeouts, sentinels)
//! - Per-site default request headers
//! - CLI option types and parsing

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{Cli, Config, LogFormat, LogLevel};
