//! Row records, the per-run accumulator and the run context.

mod accumulator;
mod value;

pub use accumulator::Accumulator;
pub use value::{FieldValue, Record};

use chrono::{DateTime, Utc};

/// Column every scraper stamps with the run timestamp.
pub const SCRAPE_DATETIME: &str = "scrape_datetime";

/// Values fixed once at the start of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    /// When the run started, written to every record.
    pub scraped_at: DateTime<Utc>,
}

impl RunContext {
    /// Context stamped with the current time.
    pub fn now() -> Self {
        Self {
            scraped_at: Utc::now(),
        }
    }

    /// A fresh record carrying only the run timestamp.
    pub fn record(&self) -> Record {
        Record::new().with(SCRAPE_DATETIME, self.scraped_at)
    }
}
