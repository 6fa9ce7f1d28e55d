//! Security and customs wait times for the three NYC-area airports.

use serde_json::Value;
use url::Url;

use crate::config::SENTINEL_UNKNOWN;
use crate::error_handling::{ProcessingStats, WarningType};
use crate::fetch::Session;
use crate::parse::{decode_json, json_field, or_sentinel, resolve_href};
use crate::record::{Accumulator, Record, RunContext};

use super::constant_url;

pub const JOB_NAME: &str = "Airport Security & Customs Wait Times Scraper";
pub const OUTPUT_DIR: &str = "16814-NYC Airports";
pub const COLUMNS: &[&str] = &[
    "scrape_datetime",
    "airport",
    "wait_time_type",
    "terminal",
    "wait_time_subtype",
    "wait_time_value",
];

const DEFAULT_ORIGIN: &str = "https://avi-prod-mpp-webapp-api.azurewebsites.net";
const AIRPORTS: &[&str] = &["JFK", "LGA", "EWR"];

/// Which queue a wait time belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTimeKind {
    Security,
    Customs,
}

impl WaitTimeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WaitTimeKind::Security => "security",
            WaitTimeKind::Customs => "customs",
        }
    }

    fn path(self, airport: &str) -> String {
        match self {
            WaitTimeKind::Security => format!("/api/v1/SecurityWaitTimesPoints/{airport}"),
            WaitTimeKind::Customs => format!("/api/CustomClearanceTimesPoints/{airport}"),
        }
    }
}

/// Rows for one airport's wait-time response.
///
/// Missing item fields are filled with `"Unknown"`. A response that is not a
/// JSON array yields no rows.
pub fn parse_wait_times(
    data: &Value,
    airport: &str,
    kind: WaitTimeKind,
    ctx: &RunContext,
    stats: &ProcessingStats,
) -> Vec<Record> {
    let Some(items) = data.as_array() else {
        log::warn!("Unexpected {} payload for {airport}: not a list", kind.as_str());
        stats.increment_warning(WarningType::EmptyResult);
        return Vec::new();
    };

    items
        .iter()
        .map(|item| {
            ctx.record()
                .with("airport", airport)
                .with("wait_time_type", kind.as_str())
                .with("terminal", or_sentinel(json_field(item, "title"), SENTINEL_UNKNOWN, stats))
                .with(
                    "wait_time_subtype",
                    or_sentinel(json_field(item, "queueType"), SENTINEL_UNKNOWN, stats),
                )
                .with(
                    "wait_time_value",
                    or_sentinel(json_field(item, "timeInMinutes"), SENTINEL_UNKNOWN, stats),
                )
        })
        .collect()
}

/// Scraper for the Port Authority wait-time API.
#[derive(Debug, Clone)]
pub struct NycAirports {
    origin: Url,
}

impl Default for NycAirports {
    fn default() -> Self {
        Self::with_origin(constant_url(DEFAULT_ORIGIN))
    }
}

impl NycAirports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scraper rooted at `origin` instead of the live API.
    pub fn with_origin(origin: Url) -> Self {
        Self { origin }
    }

    /// Fetches security then customs wait times for every airport.
    pub async fn scrape(&self, session: &Session, ctx: &RunContext) -> Accumulator {
        let mut accumulator = Accumulator::new();
        for kind in [WaitTimeKind::Security, WaitTimeKind::Customs] {
            for airport in AIRPORTS {
                accumulator.extend(self.scrape_airport(session, ctx, airport, kind).await);
            }
        }
        accumulator
    }

    async fn scrape_airport(
        &self,
        session: &Session,
        ctx: &RunContext,
        airport: &str,
        kind: WaitTimeKind,
    ) -> Vec<Record> {
        let path = kind.path(airport);
        let url = resolve_href(&self.origin, &path).unwrap_or_else(|| format!("{}{}", self.origin, path));

        let Some(body) = session.get_with_retry(&url, &[]).await else {
            log::error!("Failed to retrieve {} wait times for {airport}", kind.as_str());
            return Vec::new();
        };
        let context = format!("{} wait times at {airport}", kind.as_str());
        match decode_json(&body, &context, session.stats()) {
            Some(data) => parse_wait_times(&data, airport, kind, ctx, session.stats()),
            None => Vec::new(),
        }
    }
}
