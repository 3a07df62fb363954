//! PostgreSQL adapter for a hosted watchlist database.
//!
//! Expects `public.ohlcv (ticker, date timestamptz, open, high, low, close,
//! volume)`, `public.fundamentals (ticker, live_price, debt_to_equity,
//! dividend_yield)` and `public.watchlist (id, ticker, fair_value, tag)`.

use crate::domain::error::StockwatchError;
use crate::domain::fundamentals::Fundamentals;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::watchlist::{Classification, WatchlistEntry};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::watchlist_port::WatchlistPort;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use std::cell::RefCell;

fn query_err(e: postgres::Error) -> StockwatchError {
    StockwatchError::DatabaseQuery {
        reason: e.to_string(),
    }
}

pub struct PostgresAdapter {
    client: RefCell<Client>,
}

impl PostgresAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockwatchError> {
        let connection_string = config
            .get_string("postgres", "connection_string")
            .ok_or_else(|| StockwatchError::missing("postgres", "connection_string"))?;

        let client =
            Client::connect(&connection_string, NoTls).map_err(|e| StockwatchError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client: RefCell::new(client),
        })
    }
}

impl DataPort for PostgresAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockwatchError> {
        let start_dt: DateTime<Utc> = start_date.and_time(NaiveTime::MIN).and_utc();
        let end_dt: DateTime<Utc> = end_date
            .succ_opt()
            .unwrap_or(end_date)
            .and_time(NaiveTime::MIN)
            .and_utc();

        let query = "SELECT ticker, date, \
                            open::double precision, high::double precision, \
                            low::double precision, close::double precision, \
                            volume::bigint \
                     FROM public.ohlcv \
                     WHERE ticker = $1 AND date >= $2 AND date < $3 \
                     ORDER BY date ASC";

        let params: &[&(dyn ToSql + Sync)] = &[&ticker, &start_dt, &end_dt];
        let rows = self
            .client
            .borrow_mut()
            .query(query, params)
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let dt: DateTime<Utc> = row.get(1);
                OhlcvBar {
                    ticker: row.get(0),
                    date: dt.naive_utc().date(),
                    open: row.get(2),
                    high: row.get(3),
                    low: row.get(4),
                    close: row.get(5),
                    volume: row.get(6),
                }
            })
            .collect())
    }

    fn fetch_fundamentals(&self, ticker: &str) -> Result<Fundamentals, StockwatchError> {
        let query = "SELECT live_price::double precision, debt_to_equity::double precision, \
                            dividend_yield::double precision \
                     FROM public.fundamentals WHERE ticker = $1";

        let row = self
            .client
            .borrow_mut()
            .query_opt(query, &[&ticker])
            .map_err(query_err)?;

        Ok(row
            .map(|row| Fundamentals {
                live_price: row.get(0),
                debt_to_equity: row.get(1),
                dividend_yield: row.get(2),
            })
            .unwrap_or_default())
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockwatchError> {
        let query = "SELECT MIN(date), MAX(date), COUNT(*) FROM public.ohlcv WHERE ticker = $1";

        let row = self
            .client
            .borrow_mut()
            .query_one(query, &[&ticker])
            .map_err(query_err)?;

        let min_dt: Option<DateTime<Utc>> = row.get(0);
        let max_dt: Option<DateTime<Utc>> = row.get(1);
        let count: i64 = row.get(2);

        match (min_dt, max_dt) {
            (Some(min), Some(max)) if count > 0 => Ok(Some((
                min.naive_utc().date(),
                max.naive_utc().date(),
                count as usize,
            ))),
            _ => Ok(None),
        }
    }
}

impl WatchlistPort for PostgresAdapter {
    fn load_watchlist(&self) -> Result<Vec<WatchlistEntry>, StockwatchError> {
        let query = "SELECT upper(trim(ticker)), fair_value::double precision, tag \
                     FROM public.watchlist \
                     WHERE trim(coalesce(ticker, '')) <> '' \
                     ORDER BY id ASC";

        let rows = self
            .client
            .borrow_mut()
            .query(query, &[])
            .map_err(query_err)?;

        let mut seen = std::collections::HashSet::new();
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let ticker: String = row.get(0);
                let fair_value: Option<f64> = row.get(1);
                let tag: Option<String> = row.get(2);
                seen.insert(ticker.clone()).then(|| WatchlistEntry {
                    ticker,
                    fair_value: fair_value.filter(|v| *v > 0.0),
                    tag: tag.as_deref().and_then(Classification::parse),
                })
            })
            .collect())
    }
}
