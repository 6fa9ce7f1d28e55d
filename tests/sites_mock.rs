//! Scrapers run against mock servers standing in for the live sites.

use chrono::{NaiveDate, TimeZone, Utc};
use httptest::{matchers::*, responders::*, Expectation, Server};
use serde_json::json;
use site_scrapers::config::{AIRPORT_HEADERS, BSE_HEADERS, DONGCHEDI_HEADERS};
use site_scrapers::sites::{Brand, BseDerivatives, DongchediIndex, NycAirports};
use site_scrapers::{ErrorType, FieldValue, RunContext, WarningType};

#[path = "helpers.rs"]
mod helpers;

const REPORT_PATH: &str = "/markets/Derivatives/DeriReports/DeriHistoricalConsolidate.aspx";

fn fixed_context(y: i32, m: u32, d: u32) -> RunContext {
    RunContext {
        scraped_at: Utc
            .with_ymd_and_hms(y, m, d, 8, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

#[tokio::test]
async fn test_nyc_airports_security_then_customs() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/api/v1/SecurityWaitTimesPoints/JFK"))
            .respond_with(json_encoded(json!([
                {"title": "Terminal 4", "queueType": "General", "timeInMinutes": 14},
                {"title": "Terminal 8", "queueType": "TSA Pre", "timeInMinutes": 3}
            ]))),
    );
    for path in [
        "/api/v1/SecurityWaitTimesPoints/LGA",
        "/api/v1/SecurityWaitTimesPoints/EWR",
    ] {
        server.expect(
            Expectation::matching(request::method_path("GET", path))
                .respond_with(json_encoded(json!([]))),
        );
    }
    server.expect(
        Expectation::matching(request::method_path("GET", "/api/CustomClearanceTimesPoints/JFK"))
            .respond_with(json_encoded(json!([{"title": "Terminal 1"}]))),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/api/CustomClearanceTimesPoints/LGA"))
            .respond_with(status_code(500)),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/api/CustomClearanceTimesPoints/EWR"))
            .respond_with(status_code(200).body("<html>maintenance</html>")),
    );

    let (session, stats) = helpers::instant_session(AIRPORT_HEADERS, 1);
    let accumulator = NycAirports::with_origin(helpers::server_origin(&server))
        .scrape(&session, &RunContext::now())
        .await;

    assert_eq!(accumulator.len(), 3);
    let records = accumulator.as_slice();
    assert_eq!(records[0].get("wait_time_type"), Some(&FieldValue::from("security")));
    assert_eq!(records[1].get("wait_time_value"), Some(&FieldValue::Integer(3)));
    assert_eq!(records[2].get("wait_time_type"), Some(&FieldValue::from("customs")));
    assert_eq!(records[2].get("wait_time_subtype"), Some(&FieldValue::from("Unknown")));
    assert_eq!(stats.get_error_count(ErrorType::RequestDropped), 1);
    assert_eq!(stats.get_error_count(ErrorType::InvalidJson), 1);
}

fn report_page(view_state: &str, table: bool) -> String {
    let table_html = if table {
        r#"<table width="100%">
             <tr><th>Trade Date</th></tr>
             <tr><td>02 Jan 2025</td><td>1,204</td><td>56,000</td><td>1,234.56</td><td>0.00</td></tr>
             <tr><td>03 Jan 2025</td><td>98</td><td>1,000</td><td>77.10</td><td>3.25</td></tr>
           </table>"#
    } else {
        ""
    };
    format!(
        r#"<html><body><form>
             <input type="hidden" name="__VIEWSTATE" value="{view_state}"/>
             <input type="hidden" name="__EVENTVALIDATION" value="ev"/>
             <input type="hidden" name="__VIEWSTATEGENERATOR" value="GEN"/>
           </form>{table_html}</body></html>"#
    )
}

#[tokio::test]
async fn test_bse_postbacks_carry_state_and_cookies() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200)
                .insert_header("set-cookie", "ASP.NET_SessionId=abc123; Path=/")
                .body("<html></html>"),
        ),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", REPORT_PATH))
            .respond_with(status_code(200).body(report_page("vs-1", false))),
    );
    server.expect(
        Expectation::matching(httptest::all_of![
            request::method_path("POST", REPORT_PATH),
            request::headers(contains(key("cookie"))),
            request::body(url_decoded(contains(("__VIEWSTATE", "vs-1")))),
            request::body(url_decoded(contains(("ctl00$ContentPlaceHolder1$ddlIntrument", "IF")))),
            request::body(url_decoded(contains(("ctl00$ContentPlaceHolder1$txtDate", "01/01/2025")))),
            request::body(url_decoded(contains(("ctl00$ContentPlaceHolder1$txtTodate", "20/01/2025")))),
        ])
        .respond_with(status_code(200).body(report_page("vs-2", true))),
    );
    server.expect(
        Expectation::matching(httptest::all_of![
            request::method_path("POST", REPORT_PATH),
            request::body(url_decoded(contains(("__VIEWSTATE", "vs-2")))),
        ])
        .times(3)
        .respond_with(status_code(200).body(report_page("vs-2", false))),
    );

    let (session, stats) = helpers::instant_cookie_session(BSE_HEADERS);
    let since = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let accumulator = BseDerivatives::new(since)
        .with_origin(helpers::server_origin(&server))
        .scrape(&session, &fixed_context(2025, 1, 20))
        .await;

    assert_eq!(accumulator.len(), 2);
    let first = &accumulator.as_slice()[0];
    assert_eq!(first.get("instrument_type"), Some(&FieldValue::from("Index Futures")));
    assert_eq!(first.get("number_of_trades"), Some(&FieldValue::from("1204")));
    assert_eq!(first.get("notional_turnover"), Some(&FieldValue::from("1234.56")));
    assert_eq!(stats.get_warning_count(WarningType::MissingDataTable), 3);
}

#[tokio::test]
async fn test_bse_skips_month_when_report_page_fails() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/"))
            .respond_with(status_code(200).body("<html></html>")),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", REPORT_PATH))
            .respond_with(status_code(503)),
    );

    let (session, _) = helpers::instant_cookie_session(BSE_HEADERS);
    let since = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let accumulator = BseDerivatives::new(since)
        .with_origin(helpers::server_origin(&server))
        .scrape(&session, &fixed_context(2025, 1, 20))
        .await;

    assert!(accumulator.is_empty());
}

#[tokio::test]
async fn test_dongchedi_trend_rows_per_series() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/dzx_index/menu/rank_type"))
            .times(2)
            .respond_with(json_encoded(json!({
                "status": 0,
                "data": {"menu": [{"value": "轿车"}]}
            }))),
    );
    server.expect(
        Expectation::matching(httptest::all_of![
            request::method_path("GET", "/dzx_index/analyze/trend"),
            request::query(url_decoded(contains(("id_list", "88")))),
            request::query(url_decoded(contains(("rank_type", "轿车榜单")))),
            request::query(url_decoded(contains(("date", "2024-01-01")))),
            request::query(url_decoded(contains(("province", "全国")))),
        ])
        .respond_with(json_encoded(json!({
            "data": {
                "x_axis": ["2023-12-30", "2023-12-31"],
                "chart_data": [{"value": [1520, 1610]}]
            }
        }))),
    );
    server.expect(
        Expectation::matching(httptest::all_of![
            request::method_path("GET", "/dzx_index/analyze/trend"),
            request::query(url_decoded(contains(("id_list", "4321")))),
        ])
        .respond_with(json_encoded(json!({
            "data": {
                "x_axis": ["2023-12-30", "2023-12-31"],
                "chart_data": [{"value": [7]}]
            }
        }))),
    );

    let brands: Vec<Brand> = serde_json::from_value(json!([{
        "outter_brand_name": "比亚迪",
        "outter_brand_id": 88,
        "series": [
            {"series_id": "-1", "series_name": "全部"},
            {"series_id": 4321, "series_name": "汉"}
        ]
    }]))
    .expect("catalog should deserialize");

    let (session, stats) = helpers::instant_session(DONGCHEDI_HEADERS, 1);
    let accumulator = DongchediIndex::with_brands(brands)
        .with_origin(helpers::server_origin(&server))
        .with_floor(NaiveDate::from_ymd_opt(2023, 12, 1).unwrap())
        .scrape(&session, &fixed_context(2024, 1, 2))
        .await;

    assert_eq!(accumulator.len(), 2);
    let records = accumulator.as_slice();
    assert_eq!(records[0].get("data_date"), Some(&FieldValue::from("2023-12-30")));
    assert_eq!(records[0].get("brand"), Some(&FieldValue::from("比亚迪")));
    assert_eq!(records[1].get("value"), Some(&FieldValue::Integer(1610)));
    assert_eq!(stats.get_error_count(ErrorType::SeriesLengthMismatch), 1);
}
