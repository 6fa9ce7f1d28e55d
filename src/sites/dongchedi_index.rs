//! Dongchedi popularity index per brand and series.
//!
//! The brand catalog is a local JSON file. For every year-long window back to
//! the floor date, every brand and every series, one trend request returns a
//! daily series that becomes one row per day.

use std::path::Path;

use chrono::{Days, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::LOOKUP_TIMEOUT_SECS;
use crate::error_handling::{update_error_stats, ErrorType, ProcessingStats, SiteError, WarningType};
use crate::fetch::Session;
use crate::parse::{decode_json, resolve_href};
use crate::record::{Accumulator, FieldValue, Record, RunContext};

use super::constant_url;

pub const JOB_NAME: &str = "16800 Dongchedi Index Scrape using Requests";
pub const OUTPUT_DIR: &str = "16800-Dongchedi Index";
pub const COLUMNS: &[&str] = &["scrape_datetime", "data_date", "brand", "model", "value"];

const DEFAULT_ORIGIN: &str = "https://index.dongchedi.com";
const RANK_TYPE_PATH: &str = "/dzx_index/menu/rank_type";
const TREND_PATH: &str = "/dzx_index/analyze/trend";
const NATIONWIDE: &str = "全国";
const RANK_TYPE_SUFFIX: &str = "榜单";
const WINDOW_DAYS: u64 = 365;
/// Series id meaning "the brand as a whole".
const WHOLE_BRAND_SERIES: &str = "-1";

/// Earliest date the index is scraped back to.
pub fn default_floor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// One model line of a brand.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Series {
    pub series_id: Value,
    pub series_name: String,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Brand {
    pub outter_brand_name: String,
    pub outter_brand_id: Value,
    #[serde(default)]
    pub series: Vec<Series>,
}

/// Ids arrive as numbers or strings; the API wants them as text.
fn id_text(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Reads the brand catalog.
///
/// # Errors
///
/// Returns `SiteError` if the file cannot be read or is not a list of brands.
pub fn load_brands(path: &Path) -> Result<Vec<Brand>, SiteError> {
    let text = std::fs::read_to_string(path).map_err(|source| SiteError::CatalogRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SiteError::CatalogFormat {
        path: path.to_path_buf(),
        source,
    })
}

/// An inclusive date range queried as one trend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Year-long windows from `end` back to `floor`, newest first.
///
/// Each window is `[max(end - 365 days, floor), end]`; the next one ends the
/// day before the previous start.
pub fn year_windows(end: NaiveDate, floor: NaiveDate) -> Vec<YearWindow> {
    let mut windows = Vec::new();
    let mut end = end;
    while end >= floor {
        let start = end
            .checked_sub_days(Days::new(WINDOW_DAYS))
            .map_or(floor, |d| d.max(floor));
        windows.push(YearWindow { start, end });
        match start.pred_opt() {
            Some(previous) => end = previous,
            None => break,
        }
    }
    windows
}

/// Rank type label from a rank-type menu response.
///
/// Only a response with `status == 0` and a non-empty `data.menu` yields a
/// label: the first entry's `value` plus the ranking suffix.
pub fn parse_rank_type(data: &Value) -> Option<String> {
    if data.get("status").and_then(Value::as_i64) != Some(0) {
        log::error!("Invalid rank type response format");
        return None;
    }
    let Some(menu) = data.pointer("/data/menu").and_then(Value::as_array) else {
        log::error!("Invalid rank type response format");
        return None;
    };
    match menu.first().and_then(|entry| entry.get("value")).and_then(Value::as_str) {
        Some(value) => Some(format!("{value}{RANK_TYPE_SUFFIX}")),
        None => {
            log::warn!("Menu list is empty. No rank type available.");
            None
        }
    }
}

/// Rows from one trend response: `data.x_axis` zipped with `data.chart_data[0].value`.
///
/// An empty series is a warning; mismatched lengths are an error. Either way
/// nothing is returned for the request.
pub fn parse_trend(
    data: &Value,
    brand: &str,
    model: &str,
    ctx: &RunContext,
    stats: &ProcessingStats,
) -> Vec<Record> {
    let empty = Vec::new();
    let dates = data
        .pointer("/data/x_axis")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let values = data
        .pointer("/data/chart_data/0/value")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    if dates.is_empty() || data.pointer("/data/chart_data/0").is_none() {
        log::warn!("No data found for {brand} - {model}");
        stats.increment_warning(WarningType::EmptyResult);
        return Vec::new();
    }
    if dates.len() != values.len() {
        log::error!(
            "Mismatch in date-value lengths for {brand} - {model}: {} dates, {} values",
            dates.len(),
            values.len()
        );
        stats.increment_error(ErrorType::SeriesLengthMismatch);
        return Vec::new();
    }

    dates
        .iter()
        .zip(values)
        .map(|(date, value)| {
            ctx.record()
                .with("data_date", FieldValue::from(date))
                .with("brand", brand)
                .with("model", model)
                .with("value", FieldValue::from(value))
        })
        .collect()
}

/// Scraper for the Dongchedi index API.
#[derive(Debug, Clone)]
pub struct DongchediIndex {
    origin: Url,
    brands: Vec<Brand>,
    floor: NaiveDate,
}

impl DongchediIndex {
    /// Scraper for the live API using the catalog at `path`.
    ///
    /// # Errors
    ///
    /// Returns `SiteError` if the catalog cannot be loaded.
    pub fn from_catalog(path: &Path) -> Result<Self, SiteError> {
        let brands = load_brands(path)?;
        log::info!("Loaded {} brands from {}", brands.len(), path.display());
        Ok(Self::with_brands(brands))
    }

    pub fn with_brands(brands: Vec<Brand>) -> Self {
        Self {
            origin: constant_url(DEFAULT_ORIGIN),
            brands,
            floor: default_floor(),
        }
    }

    /// Points the scraper at `origin` instead of the live API.
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = origin;
        self
    }

    /// Stops the windows at `floor` instead of the default start of 2021.
    pub fn with_floor(mut self, floor: NaiveDate) -> Self {
        self.floor = floor;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        resolve_href(&self.origin, path).unwrap_or_else(|| format!("{}{}", self.origin, path))
    }

    /// Windows for a run, ending the day before the run started.
    pub fn windows(&self, ctx: &RunContext) -> Vec<YearWindow> {
        match ctx.scraped_at.date_naive().pred_opt() {
            Some(yesterday) => year_windows(yesterday, self.floor),
            None => Vec::new(),
        }
    }

    /// Fetches every window × brand × series.
    pub async fn scrape(&self, session: &Session, ctx: &RunContext) -> Accumulator {
        let mut accumulator = Accumulator::new();
        for window in self.windows(ctx) {
            for brand in &self.brands {
                for series in &brand.series {
                    let rows = self.fetch_trend(session, ctx, &window, brand, series).await;
                    accumulator.extend(rows);
                }
            }
        }
        accumulator
    }

    /// Single attempt with the short lookup deadline; failures only cost the label.
    async fn fetch_rank_type(&self, session: &Session, brand_id: &str, series_id: &str) -> Option<String> {
        let url = self.endpoint(RANK_TYPE_PATH);
        let query = [("outter_brand_id", brand_id), ("series_id", series_id)];
        let timeout = std::time::Duration::from_secs(LOOKUP_TIMEOUT_SECS);
        match session.get_text_with_timeout(&url, &query, timeout).await {
            Ok(body) => decode_json(&body, &url, session.stats()).and_then(|data| parse_rank_type(&data)),
            Err(e) => {
                log::error!("Error fetching rank type: {e}");
                update_error_stats(session.stats(), &e);
                None
            }
        }
    }

    async fn fetch_trend(
        &self,
        session: &Session,
        ctx: &RunContext,
        window: &YearWindow,
        brand: &Brand,
        series: &Series,
    ) -> Vec<Record> {
        let brand_id = id_text(&brand.outter_brand_id);
        let series_id = id_text(&series.series_id);
        let rank_type = self.fetch_rank_type(session, &brand_id, &series_id).await;

        let end = window.end.format("%Y-%m-%d").to_string();
        let id_list = if series_id == WHOLE_BRAND_SERIES {
            brand_id.as_str()
        } else {
            series_id.as_str()
        };
        let mut query = vec![
            ("date", end.as_str()),
            ("province", NATIONWIDE),
        ];
        if let Some(rank_type) = rank_type.as_deref() {
            query.push(("rank_type", rank_type));
        }
        query.extend([
            ("sub_rank_type", ""),
            ("id_list", id_list),
            ("name_list", brand.outter_brand_name.as_str()),
        ]);

        let url = self.endpoint(TREND_PATH);
        let label = format!(
            "{} to {} - {} - {}",
            window.start, window.end, brand.outter_brand_name, series.series_name
        );
        let Some(body) = session.get_with_retry(&url, &query).await else {
            log::error!("Request failed for {label}");
            return Vec::new();
        };
        let Some(data) = decode_json(&body, &url, session.stats()) else {
            return Vec::new();
        };

        let rows = parse_trend(
            &data,
            &brand.outter_brand_name,
            &series.series_name,
            ctx,
            session.stats(),
        );
        if !rows.is_empty() {
            log::info!("Data from {label} saved successfully ({} rows)", rows.len());
        }
        rows
    }
}
