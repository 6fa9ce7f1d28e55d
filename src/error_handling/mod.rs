//! Error handling and processing statistics.
//!
//! This module provides:
//! - Library error types (`thiserror`)
//! - Error and warning categories for absorbed failures
//! - Processing statistics tracking
//! - Categorization of failed request attempts
//!
//! Errors are either absorbed (counted, then the item or page is dropped or a
//! sentinel is written) or terminal (initialization, export).

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::update_error_stats;
pub use stats::ProcessingStats;
pub use types::{ErrorType, ExportError, FetchError, InitializationError, SiteError, WarningType};
