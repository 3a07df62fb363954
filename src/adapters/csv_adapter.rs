//! CSV file adapter: per-ticker price files, a fundamentals file and the
//! exported watchlist sheet.
//!
//! Layout under the data directory:
//! - `<TICKER>.csv` with columns `date,open,high,low,close,volume` (any
//!   order, case-insensitive headers, extra columns ignored)
//! - `fundamentals.csv` with `ticker,live_price,debt_to_equity,dividend_yield`
//!   (optional; blank cells are absent)

use crate::domain::error::StockwatchError;
use crate::domain::fundamentals::Fundamentals;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::watchlist::{WatchlistEntry, entries_from_rows};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::watchlist_port::WatchlistPort;
use chrono::NaiveDate;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

const FUNDAMENTALS_FILE: &str = "fundamentals.csv";

pub struct CsvAdapter {
    base_path: PathBuf,
    watchlist_path: Option<PathBuf>,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            watchlist_path: None,
        }
    }

    pub fn with_watchlist(mut self, path: PathBuf) -> Self {
        self.watchlist_path = Some(path);
        self
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockwatchError> {
        let dir = config
            .get_string("csv", "dir")
            .ok_or_else(|| StockwatchError::missing("csv", "dir"))?;
        let mut adapter = Self::new(PathBuf::from(dir));
        if let Some(watchlist) = config.get_string("csv", "watchlist") {
            adapter = adapter.with_watchlist(PathBuf::from(watchlist));
        }
        Ok(adapter)
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn read_file(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), StockwatchError> {
        let content = fs::read_to_string(path).map_err(|e| StockwatchError::Database {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| StockwatchError::Database {
                reason: format!("CSV header error in {}: {}", path.display(), e),
            })?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| StockwatchError::Database {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok((headers, rows))
    }
}

fn column(headers: &[String], name: &str) -> Result<usize, StockwatchError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| StockwatchError::Database {
            reason: format!("missing {} column", name),
        })
}

fn parse_number(row: &[String], idx: usize, name: &str) -> Result<f64, StockwatchError> {
    row.get(idx)
        .ok_or_else(|| StockwatchError::Database {
            reason: format!("missing {} value", name),
        })?
        .parse()
        .map_err(|e| StockwatchError::Database {
            reason: format!("invalid {} value: {}", name, e),
        })
}

fn optional_number(row: &[String], idx: Option<usize>) -> Option<f64> {
    idx.and_then(|i| row.get(i))
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
}

/// Accepts `2024-01-15` and timestamps such as `2024-01-15 00:00:00-05:00`.
fn parse_date(raw: &str) -> Result<NaiveDate, StockwatchError> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| StockwatchError::Database {
        reason: format!("invalid date format '{}': {}", raw, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockwatchError> {
        let path = self.csv_path(ticker);
        let (headers, rows) = Self::read_file(&path)?;

        let date_idx = column(&headers, "date")?;
        let open_idx = column(&headers, "open")?;
        let high_idx = column(&headers, "high")?;
        let low_idx = column(&headers, "low")?;
        let close_idx = column(&headers, "close")?;
        let volume_idx = column(&headers, "volume")?;

        let parse_row = |row: &[String]| -> Result<OhlcvBar, StockwatchError> {
            let date_str = row.get(date_idx).ok_or_else(|| StockwatchError::Database {
                reason: "missing date value".into(),
            })?;
            Ok(OhlcvBar {
                ticker: ticker.to_string(),
                date: parse_date(date_str)?,
                open: parse_number(row, open_idx, "open")?,
                high: parse_number(row, high_idx, "high")?,
                low: parse_number(row, low_idx, "low")?,
                close: parse_number(row, close_idx, "close")?,
                volume: parse_number(row, volume_idx, "volume")? as i64,
            })
        };

        let mut bars = Vec::new();
        for row in &rows {
            let bar = match parse_row(row.as_slice()) {
                Ok(bar) => bar,
                Err(e) => {
                    let date = row.get(date_idx).map(String::as_str).unwrap_or("?");
                    warn!("skipping row {} in {}: {}", date, path.display(), e);
                    continue;
                }
            };
            if bar.date >= start_date && bar.date <= end_date {
                bars.push(bar);
            }
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn fetch_fundamentals(&self, ticker: &str) -> Result<Fundamentals, StockwatchError> {
        let path = self.base_path.join(FUNDAMENTALS_FILE);
        if !path.exists() {
            return Ok(Fundamentals::default());
        }

        let (headers, rows) = Self::read_file(&path)?;
        let ticker_idx = column(&headers, "ticker")?;
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let live_idx = find("live_price");
        let debt_idx = find("debt_to_equity");
        let yield_idx = find("dividend_yield");

        Ok(rows
            .iter()
            .find(|row| {
                row.get(ticker_idx)
                    .is_some_and(|t| t.eq_ignore_ascii_case(ticker))
            })
            .map(|row| Fundamentals {
                live_price: optional_number(row, live_idx),
                debt_to_equity: optional_number(row, debt_idx),
                dividend_yield: optional_number(row, yield_idx),
            })
            .unwrap_or_default())
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockwatchError> {
        let path = self.csv_path(ticker);
        if !path.exists() {
            return Ok(None);
        }
        let bars = self.fetch_ohlcv(ticker, NaiveDate::MIN, NaiveDate::MAX)?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, bars.len()))),
            _ => Ok(None),
        }
    }
}

impl WatchlistPort for CsvAdapter {
    fn load_watchlist(&self) -> Result<Vec<WatchlistEntry>, StockwatchError> {
        let path = self
            .watchlist_path
            .as_ref()
            .ok_or_else(|| StockwatchError::missing("csv", "watchlist"))?;
        let (headers, rows) = Self::read_file(path)?;
        Ok(entries_from_rows(&headers, rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::watchlist::{Classification, WatchlistError};
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";
        fs::write(path.join("SAP.csv"), csv_content).unwrap();

        let yahoo_style = "Date,Open,High,Low,Close,Adj Close,Volume\n\
            2024-01-15 00:00:00-05:00,370.0,375.0,365.0,372.5,372.5,21000000.0\n";
        fs::write(path.join("MSFT.csv"), yahoo_style).unwrap();

        fs::write(
            path.join(FUNDAMENTALS_FILE),
            "ticker,live_price,debt_to_equity,dividend_yield\n\
             SAP,116.5,21.4,\n\
             MSFT,,0.35,0.008\n",
        )
        .unwrap();

        fs::write(
            path.join("watchlist.csv"),
            " Ticker ,FairValue,Tag\nsap,130,Tranche\nmsft,,recurring-buy\n,,\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_ohlcv_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 17).unwrap();
        let bars = adapter.fetch_ohlcv("SAP", start, end).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, start);
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[2].date, end);
    }

    #[test]
    fn fetch_ohlcv_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let day = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let bars = adapter.fetch_ohlcv("SAP", day, day).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, day);
    }

    #[test]
    fn fetch_ohlcv_reads_timestamped_export() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let bars = adapter
            .fetch_ohlcv("MSFT", NaiveDate::MIN, NaiveDate::MAX)
            .unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 372.5);
        assert_eq!(bars[0].volume, 21_000_000);
    }

    #[test]
    fn fetch_ohlcv_skips_row_with_blank_cell() {
        let (_dir, path) = setup_test_data();
        fs::write(
            path.join("GAP.csv"),
            "date,open,high,low,close,volume\n\
             2024-01-01,1,1,1,1,10\n\
             2024-01-02,1,1,1,,10\n\
             not-a-date,1,1,1,1,10\n\
             2024-01-03,2,2,2,2,20\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(path);

        let bars = adapter
            .fetch_ohlcv("GAP", NaiveDate::MIN, NaiveDate::MAX)
            .unwrap();
        let days: Vec<u32> = bars.iter().map(|b| chrono::Datelike::day(&b.date)).collect();
        assert_eq!(days, vec![1, 3]);
        assert_eq!(bars[1].close, 2.0);
    }

    #[test]
    fn fetch_ohlcv_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_ohlcv("XYZ", NaiveDate::MIN, NaiveDate::MAX);
        assert!(matches!(result, Err(StockwatchError::Database { .. })));
    }

    #[test]
    fn fundamentals_blank_cells_are_absent() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let sap = adapter.fetch_fundamentals("SAP").unwrap();
        assert_eq!(sap.live_price, Some(116.5));
        assert_eq!(sap.debt_to_equity, Some(21.4));
        assert_eq!(sap.dividend_yield, None);

        let msft = adapter.fetch_fundamentals("msft").unwrap();
        assert_eq!(msft.live_price, None);
        assert_eq!(msft.dividend_yield, Some(0.008));

        assert_eq!(adapter.fetch_fundamentals("XYZ").unwrap(), Fundamentals::default());
    }

    #[test]
    fn fundamentals_file_is_optional() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert_eq!(adapter.fetch_fundamentals("SAP").unwrap(), Fundamentals::default());
    }

    #[test]
    fn data_range_for_ticker() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let (min, max, count) = adapter.get_data_range("SAP").unwrap().unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        assert_eq!(count, 3);
        assert_eq!(adapter.get_data_range("XYZ").unwrap(), None);
    }

    #[test]
    fn load_watchlist_from_sheet() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path.clone()).with_watchlist(path.join("watchlist.csv"));
        let entries = adapter.load_watchlist().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].ticker, "SAP");
        assert_eq!(entries[0].fair_value, Some(130.0));
        assert_eq!(entries[0].tag, Some(Classification::Tranche));
        assert_eq!(entries[1].tag, Some(Classification::RecurringBuy));
    }

    #[test]
    fn load_watchlist_without_ticker_column() {
        let (_dir, path) = setup_test_data();
        fs::write(path.join("bad.csv"), "Symbol,Price\nSAP,1\n").unwrap();
        let adapter = CsvAdapter::new(path.clone()).with_watchlist(path.join("bad.csv"));
        assert!(matches!(
            adapter.load_watchlist(),
            Err(StockwatchError::Watchlist(WatchlistError::MissingTickerColumn))
        ));
    }

    #[test]
    fn load_watchlist_requires_path() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(matches!(
            adapter.load_watchlist(),
            Err(StockwatchError::ConfigMissing { key, .. }) if key == "watchlist"
        ));
    }
}
