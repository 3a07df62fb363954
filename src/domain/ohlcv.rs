//! OHLCV bar and per-ticker price series.

use chrono::{Duration, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// Close-to-close change against the previous bar.
    pub fn change_from(&self, prev_close: f64) -> f64 {
        self.close - prev_close
    }
}

/// Daily bars for one ticker, ascending by date.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    pub ticker: String,
    pub bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    /// Builds a series, sorting the bars by date.
    pub fn new(ticker: impl Into<String>, mut bars: Vec<OhlcvBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self {
            ticker: ticker.into(),
            bars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn last(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    /// A copy without bars whose close is NaN or infinite.
    pub fn without_gaps(&self) -> PriceSeries {
        PriceSeries {
            ticker: self.ticker.clone(),
            bars: self.bars.iter().filter(|b| b.close.is_finite()).cloned().collect(),
        }
    }

    /// Bars dated within `days` calendar days of the last bar.
    ///
    /// The last bar is always retained, so a non-empty series never trims
    /// to empty.
    pub fn trailing_days(&self, days: u32) -> &[OhlcvBar] {
        let Some(last) = self.bars.last() else {
            return &self.bars;
        };
        let cutoff = last.date - Duration::days(i64::from(days));
        let start = self.bars.partition_point(|b| b.date <= cutoff);
        &self.bars[start.min(self.bars.len() - 1)..]
    }

    /// A new series holding only [`trailing_days`](Self::trailing_days).
    pub fn retain_window(&self, days: u32) -> PriceSeries {
        PriceSeries {
            ticker: self.ticker.clone(),
            bars: self.trailing_days(days).to_vec(),
        }
    }
}
