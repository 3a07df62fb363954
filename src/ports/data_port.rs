//! Market data access port trait.

use crate::domain::error::StockwatchError;
use crate::domain::fundamentals::Fundamentals;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `ticker` dated within `[start_date, end_date]`,
    /// ascending. An unknown ticker may yield an empty vector or an error.
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockwatchError>;

    /// Fundamentals for `ticker`. Backends without fundamentals report
    /// every field as absent.
    fn fetch_fundamentals(&self, _ticker: &str) -> Result<Fundamentals, StockwatchError> {
        Ok(Fundamentals::default())
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockwatchError>;
}
