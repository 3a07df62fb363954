//! JSON report adapter for downstream tooling.

use crate::domain::error::StockwatchError;
use crate::domain::scan::ScanReport;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for JsonReportAdapter {
    fn render(&self, report: &ScanReport) -> Result<String, StockwatchError> {
        let mut out = serde_json::to_string_pretty(report).map_err(|e| StockwatchError::Report {
            reason: e.to_string(),
        })?;
        out.push('\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scan::{ScanRow, SkipReason};
    use crate::domain::thresholds::Thresholds;
    use crate::domain::watchlist::WatchlistEntry;
    use chrono::NaiveDate;

    #[test]
    fn skipped_rows_are_tagged() {
        let report = ScanReport {
            as_of: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            thresholds: Thresholds::default(),
            rows: vec![ScanRow::Skipped {
                entry: WatchlistEntry::new("GONE"),
                reason: SkipReason::FetchFailed {
                    reason: "timeout".into(),
                },
            }],
        };
        let json = JsonReportAdapter::new().render(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["as_of"], "2024-06-03");
        assert_eq!(value["thresholds"]["rsi_period"], 14);
        let row = &value["rows"][0];
        assert_eq!(row["status"], "skipped");
        assert_eq!(row["entry"]["ticker"], "GONE");
        assert_eq!(row["reason"]["kind"], "fetch_failed");
        assert_eq!(row["reason"]["reason"], "timeout");
    }
}
