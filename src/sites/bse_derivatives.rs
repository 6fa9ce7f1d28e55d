//! BSE historical derivatives turnover.
//!
//! The report is an ASP.NET postback form. Each month starts from a fresh GET
//! of the report page to pick up the hidden state fields; every filter is
//! then posted in turn, carrying the state fields forward from the previous
//! response.

use std::sync::LazyLock;

use chrono::{Datelike, Months, NaiveDate};
use scraper::{Html, Selector};
use url::Url;

use crate::error_handling::{ProcessingStats, WarningType};
use crate::fetch::Session;
use crate::parse::{element_text, input_value, parse_selector_with_fallback, resolve_href};
use crate::record::{Accumulator, Record, RunContext};

use super::constant_url;

pub const JOB_NAME: &str = "16915 BSE Jack IPD using requests";
pub const OUTPUT_DIR: &str = "16915-BSE Jack IPD";
pub const COLUMNS: &[&str] = &[
    "scrape_datetime",
    "instrument_type",
    "date",
    "number_of_trades",
    "volume",
    "notional_turnover",
    "premium_turnover",
];

const DEFAULT_ORIGIN: &str = "https://www.bseindia.com";
const REPORT_PATH: &str = "/markets/Derivatives/DeriReports/DeriHistoricalConsolidate.aspx";
const FORM_DATE_FORMAT: &str = "%d/%m/%Y";
const HEADER_MARKER: &str = "Trade DateNum";
const MIN_CELLS: usize = 5;

const FIELD_SEGMENT: &str = "ctl00$ContentPlaceHolder1$ddlsegment";
const FIELD_INSTRUMENT: &str = "ctl00$ContentPlaceHolder1$ddlIntrument";
const FIELD_UNDERLYING: &str = "ctl00$ContentPlaceHolder1$ddlUnderLine";
const FIELD_FROM: &str = "ctl00$ContentPlaceHolder1$txtDate";
const FIELD_TO: &str = "ctl00$ContentPlaceHolder1$txtTodate";
const FIELD_SUBMIT: &str = "ctl00$ContentPlaceHolder1$btnGo";

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback(r#"table[width="100%"]"#, "report table"));
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("tr", "report rows"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("td", "report cells"));

/// Start of the default history.
pub fn default_since() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// One segment/instrument combination of the report form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportFilter {
    /// Segment dropdown value.
    pub segment: &'static str,
    /// Label written to the `instrument_type` column.
    pub instrument: &'static str,
    /// Instrument dropdown value.
    pub code: &'static str,
}

pub const FILTERS: &[ReportFilter] = &[
    ReportFilter { segment: "Index Derivative", instrument: "Index Futures", code: "IF" },
    ReportFilter { segment: "Index Derivative", instrument: "Index Options", code: "IO" },
    ReportFilter { segment: "Equity Derivative", instrument: "Equity Futures", code: "SF" },
    ReportFilter { segment: "Equity Derivative", instrument: "Index Options", code: "SO" },
];

/// A date range submitted as one report query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl MonthWindow {
    pub fn from_text(&self) -> String {
        self.from.format(FORM_DATE_FORMAT).to_string()
    }

    pub fn to_text(&self) -> String {
        self.to.format(FORM_DATE_FORMAT).to_string()
    }
}

/// Monthly windows from `since` up to `today`.
///
/// Each window runs from its start to the first of the following month,
/// capped at `today`; the next window starts on that first of month.
pub fn month_windows(since: NaiveDate, today: NaiveDate) -> Vec<MonthWindow> {
    let mut windows = Vec::new();
    let mut start = since;
    while start < today {
        let Some(next_month) = start
            .with_day(1)
            .and_then(|first| first.checked_add_months(Months::new(1)))
        else {
            break;
        };
        windows.push(MonthWindow {
            from: start,
            to: next_month.min(today),
        });
        start = next_month;
    }
    windows
}

/// Hidden ASP.NET state fields echoed back with every postback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub view_state: String,
    pub event_validation: String,
    pub view_state_generator: String,
}

impl FormState {
    /// Reads the hidden fields; absent fields are empty.
    pub fn from_document(document: &Html) -> Self {
        Self {
            view_state: input_value(document, "__VIEWSTATE").unwrap_or_default(),
            event_validation: input_value(document, "__EVENTVALIDATION").unwrap_or_default(),
            view_state_generator: input_value(document, "__VIEWSTATEGENERATOR")
                .unwrap_or_default(),
        }
    }

    /// Form body for one filter and window.
    pub fn form<'a>(
        &'a self,
        filter: &ReportFilter,
        from: &'a str,
        to: &'a str,
    ) -> Vec<(&'static str, &'a str)> {
        vec![
            (FIELD_SEGMENT, filter.segment),
            (FIELD_INSTRUMENT, filter.code),
            (FIELD_UNDERLYING, "0"),
            (FIELD_FROM, from),
            (FIELD_TO, to),
            (FIELD_SUBMIT, "Go"),
            ("__VIEWSTATE", self.view_state.as_str()),
            ("__VIEWSTATEGENERATOR", self.view_state_generator.as_str()),
            ("__EVENTVALIDATION", self.event_validation.as_str()),
        ]
    }
}

/// Rows of the first full-width table, minus its header row.
///
/// Rows with fewer than five cells or repeating the header are skipped;
/// thousands separators are stripped from the numeric cells. A response
/// without the table yields no rows.
pub fn parse_report(
    document: &Html,
    instrument: &str,
    ctx: &RunContext,
    stats: &ProcessingStats,
) -> Vec<Record> {
    let Some(table) = document.select(&TABLE_SELECTOR).next() else {
        log::warn!("No data table found for {instrument}");
        stats.increment_warning(WarningType::MissingDataTable);
        return Vec::new();
    };

    table
        .select(&ROW_SELECTOR)
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&CELL_SELECTOR).map(|td| element_text(&td)).collect();
            if cells.len() < MIN_CELLS || cells[0].contains(HEADER_MARKER) {
                return None;
            }
            let number = |i: usize| cells[i].replace(',', "");
            Some(
                ctx.record()
                    .with("instrument_type", instrument)
                    .with("date", cells[0].as_str())
                    .with("number_of_trades", number(1))
                    .with("volume", number(2))
                    .with("notional_turnover", number(3))
                    .with("premium_turnover", number(4)),
            )
        })
        .collect()
}

/// Scraper for the BSE derivatives report.
#[derive(Debug, Clone)]
pub struct BseDerivatives {
    origin: Url,
    since: NaiveDate,
}

impl Default for BseDerivatives {
    fn default() -> Self {
        Self::new(default_since())
    }
}

impl BseDerivatives {
    /// Scraper for the live site, starting at `since`.
    pub fn new(since: NaiveDate) -> Self {
        Self {
            origin: constant_url(DEFAULT_ORIGIN),
            since,
        }
    }

    /// Points the scraper at `origin` instead of the live site.
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = origin;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        resolve_href(&self.origin, path).unwrap_or_else(|| format!("{}{}", self.origin, path))
    }

    /// Queries every filter for every month since the start date.
    pub async fn scrape(&self, session: &Session, ctx: &RunContext) -> Accumulator {
        let mut accumulator = Accumulator::new();
        let today = ctx.scraped_at.date_naive();
        for window in month_windows(self.since, today) {
            accumulator.extend(self.scrape_month(session, ctx, &window).await);
        }
        accumulator
    }

    async fn scrape_month(&self, session: &Session, ctx: &RunContext, window: &MonthWindow) -> Vec<Record> {
        let home = self.endpoint("/");
        let report = self.endpoint(REPORT_PATH);
        let (from, to) = (window.from_text(), window.to_text());

        // Warm-up visit for session cookies; the result is not needed.
        let _ = session.get_with_retry(&home, &[]).await;

        let Some(page) = session.get_with_retry(&report, &[]).await else {
            log::error!("Failed to load the report page for {from} to {to}; skipping month");
            return Vec::new();
        };
        let mut state = FormState::from_document(&Html::parse_document(&page));
        log::debug!(
            "Hidden fields: VIEWSTATE {} chars, VIEWSTATEGENERATOR {}",
            state.view_state.len(),
            state.view_state_generator
        );

        let mut rows = Vec::new();
        for filter in FILTERS {
            log::info!(
                "Fetching data for Segment: {}, Instrument: {} From Date: {} to {}",
                filter.segment,
                filter.instrument,
                from,
                to
            );
            let Some(body) = session
                .post_form_with_retry(&report, &state.form(filter, &from, &to))
                .await
            else {
                log::error!(
                    "Failed to fetch data for {} - {} From Date: {} to {}",
                    filter.segment,
                    filter.instrument,
                    from,
                    to
                );
                continue;
            };

            let (found, next_state) = {
                let document = Html::parse_document(&body);
                (
                    parse_report(&document, filter.instrument, ctx, session.stats()),
                    FormState::from_document(&document),
                )
            };
            log::info!("{} rows for {} - {}", found.len(), filter.segment, filter.instrument);
            rows.extend(found);
            state = next_state;
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const REPORT: &str = r#"
        <html><body>
          <form>
            <input type="hidden" name="__VIEWSTATE" value="vs-2"/>
            <input type="hidden" name="__EVENTVALIDATION" value="ev-2"/>
            <input type="hidden" name="__VIEWSTATEGENERATOR" value="GEN"/>
          </form>
          <table width="100%">
            <tr><th>Trade Date</th><th>Trades</th></tr>
            <tr><td>Trade DateNum</td><td>a</td><td>b</td><td>c</td><td>d</td></tr>
            <tr><td> 02 Jan 2025 </td><td>1,204</td><td>56,000</td><td>1,234.56</td><td>0.00</td></tr>
            <tr><td>03 Jan 2025</td><td>98</td><td>1,000</td><td>77.10</td><td>3.25</td></tr>
            <tr><td colspan="5">Total</td></tr>
          </table>
        </body></html>"#;

    #[test]
    fn test_month_windows() {
        let windows = month_windows(date(2025, 1, 1), date(2025, 3, 15));
        assert_eq!(
            windows,
            vec![
                MonthWindow { from: date(2025, 1, 1), to: date(2025, 2, 1) },
                MonthWindow { from: date(2025, 2, 1), to: date(2025, 3, 1) },
                MonthWindow { from: date(2025, 3, 1), to: date(2025, 3, 15) },
            ]
        );
        assert_eq!(windows[0].from_text(), "01/01/2025");
        assert_eq!(windows[2].to_text(), "15/03/2025");
    }

    #[test]
    fn test_month_windows_stop_at_first_of_month() {
        let windows = month_windows(date(2025, 4, 1), date(2025, 5, 1));
        assert_eq!(
            windows,
            vec![MonthWindow { from: date(2025, 4, 1), to: date(2025, 5, 1) }]
        );
    }

    #[test]
    fn test_month_windows_mid_month_start_and_empty_range() {
        let windows = month_windows(date(2025, 1, 20), date(2025, 2, 10));
        assert_eq!(windows[0], MonthWindow { from: date(2025, 1, 20), to: date(2025, 2, 1) });
        assert_eq!(windows.len(), 2);
        assert!(month_windows(date(2025, 5, 1), date(2025, 5, 1)).is_empty());
    }

    #[test]
    fn test_parse_report_rows() {
        let stats = ProcessingStats::new();
        let document = Html::parse_document(REPORT);
        let rows = parse_report(&document, "Index Futures", &RunContext::now(), &stats);

        assert_eq!(rows.len(), 2);
        let first: Vec<String> = rows[0].cells(COLUMNS).skip(1).collect();
        assert_eq!(
            first,
            vec!["Index Futures", "02 Jan 2025", "1204", "56000", "1234.56", "0.00"]
        );
    }

    #[test]
    fn test_missing_table_is_counted() {
        let stats = ProcessingStats::new();
        let document = Html::parse_document("<html><body><p>No records</p></body></html>");
        assert!(parse_report(&document, "Index Options", &RunContext::now(), &stats).is_empty());
        assert_eq!(stats.get_warning_count(WarningType::MissingDataTable), 1);
    }

    #[test]
    fn test_form_state_round_trips_into_form() {
        let document = Html::parse_document(REPORT);
        let state = FormState::from_document(&document);
        assert_eq!(state.view_state, "vs-2");
        assert_eq!(state.event_validation, "ev-2");
        assert_eq!(state.view_state_generator, "GEN");

        let form = state.form(&FILTERS[2], "01/01/2025", "01/02/2025");
        assert!(form.contains(&(FIELD_SEGMENT, "Equity Derivative")));
        assert!(form.contains(&(FIELD_INSTRUMENT, "SF")));
        assert!(form.contains(&(FIELD_UNDERLYING, "0")));
        assert!(form.contains(&("__VIEWSTATE", "vs-2")));
    }

    #[test]
    fn test_form_state_defaults_to_empty() {
        let state = FormState::from_document(&Html::parse_document("<html></html>"));
        assert_eq!(state, FormState::default());
    }
}
