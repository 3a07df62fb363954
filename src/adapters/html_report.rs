//! HTML report adapter implementing ReportPort.
//!
//! Renders the scan as a single self-contained page via an Askama template.

use askama::Template;

use crate::adapters::report_rows::{DisplayRow, HEADERS, display_rows};
use crate::domain::error::StockwatchError;
use crate::domain::scan::ScanReport;
use crate::domain::signal::Signal;
use crate::ports::report_port::ReportPort;

const TREND_COLUMN: usize = 7;

#[derive(Template)]
#[template(path = "watchlist.html")]
struct WatchlistTemplate<'a> {
    as_of: chrono::NaiveDate,
    headers: &'a [&'a str],
    rows: Vec<DisplayRow>,
    notes: Vec<String>,
    trend_column: usize,
    buy: usize,
    watch: usize,
    wait: usize,
    skipped: usize,
    rsi_period: usize,
    rsi_buy_threshold: f64,
    sma_period: usize,
    margin_of_safety: f64,
}

#[derive(Debug, Default)]
pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for HtmlReportAdapter {
    fn render(&self, report: &ScanReport) -> Result<String, StockwatchError> {
        let rows = display_rows(report);
        let notes = rows
            .iter()
            .filter_map(|r| r.note.as_ref().map(|n| format!("{}: {}", r.cells[0], n)))
            .collect();

        let template = WatchlistTemplate {
            as_of: report.as_of,
            headers: &HEADERS,
            rows,
            notes,
            trend_column: TREND_COLUMN,
            buy: report.count_signal(Signal::Buy),
            watch: report.count_signal(Signal::Watch),
            wait: report.count_signal(Signal::Wait),
            skipped: report.skipped().count(),
            rsi_period: report.thresholds.rsi_period,
            rsi_buy_threshold: report.thresholds.rsi_buy_threshold,
            sma_period: report.thresholds.sma_period,
            margin_of_safety: report.thresholds.margin_of_safety_pct,
        };

        template.render().map_err(|e| StockwatchError::Report {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scan::{ScanRow, SkipReason};
    use crate::domain::thresholds::Thresholds;
    use crate::domain::watchlist::WatchlistEntry;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    fn sample_report() -> ScanReport {
        ScanReport {
            as_of: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            thresholds: Thresholds::default(),
            rows: vec![ScanRow::Skipped {
                entry: WatchlistEntry::new("GONE"),
                reason: SkipReason::NoData,
            }],
        }
    }

    #[test]
    fn trend_column_matches_header() {
        assert_eq!(HEADERS[TREND_COLUMN], "Trend");
    }

    #[test]
    fn renders_table_and_summary() {
        let html = HtmlReportAdapter::new().render(&sample_report()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("as of 2024-06-03"));
        assert!(html.contains("<th>Ticker</th>"));
        assert!(html.contains("<td>GONE</td>"));
        assert!(html.contains("1 skipped"));
        assert!(html.contains("GONE: no data"));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("watchlist.html");
        HtmlReportAdapter::new()
            .write(&sample_report(), Some(&path))
            .unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("</html>"));
    }
}
