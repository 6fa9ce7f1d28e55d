//! Main application modules.
//!
//! This module provides the statistics printing used at the end of a run.

pub mod statistics;

// Re-export public API
pub use statistics::{print_error_statistics, print_run_summary};
