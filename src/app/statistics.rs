//! End-of-run statistics.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, ProcessingStats, WarningType};
use crate::sites::Site;

/// Prints a one-line summary of the run.
pub fn print_run_summary(site: Site, records: usize, elapsed_seconds: f64) {
    info!(
        "✅ Scraped {} record{} for {} in {:.1}s",
        records,
        if records == 1 { "" } else { "s" },
        site.job_name(),
        elapsed_seconds
    );
}

/// Prints error and warning counts to the log.
///
/// Only categories with a non-zero count are listed.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    let total_warnings = error_stats.total_warnings();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = error_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_warnings > 0 {
        info!("Warning Counts ({} total):", total_warnings);
        for warning_type in WarningType::iter() {
            let count = error_stats.get_warning_count(warning_type);
            if count > 0 {
                info!("   {}: {}", warning_type.as_str(), count);
            }
        }
    }
}
