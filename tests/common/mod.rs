#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use stockwatch::domain::error::StockwatchError;
use stockwatch::domain::fundamentals::Fundamentals;
pub use stockwatch::domain::ohlcv::OhlcvBar;
use stockwatch::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub fundamentals: HashMap<String, Fundamentals>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            fundamentals: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_fundamentals(mut self, ticker: &str, fundamentals: Fundamentals) -> Self {
        self.fundamentals.insert(ticker.to_string(), fundamentals);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockwatchError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(StockwatchError::Database {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn fetch_fundamentals(&self, ticker: &str) -> Result<Fundamentals, StockwatchError> {
        Ok(self.fundamentals.get(ticker).cloned().unwrap_or_default())
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockwatchError> {
        match self.data.get(ticker) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily bars from `start`, one per close, with high = low = close.
pub fn bars_from_closes(ticker: &str, start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            ticker: ticker.to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        })
        .collect()
}

/// `count` bars rising by one per day from `start_price`.
pub fn rising_bars(ticker: &str, start: NaiveDate, count: usize, start_price: f64) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    bars_from_closes(ticker, start, &closes)
}

/// 60 rising bars (100 to 159) followed by 20 bars falling 3 per day.
/// Ends at 99 with RSI 0 and a correction far deeper than its average.
pub fn selloff_bars(ticker: &str, start: NaiveDate) -> Vec<OhlcvBar> {
    let mut closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
    closes.extend((1..=20).map(|i| 159.0 - 3.0 * i as f64));
    bars_from_closes(ticker, start, &closes)
}
