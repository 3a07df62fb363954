//! SQLite adapter for prices, fundamentals and the watchlist table.

use crate::domain::error::StockwatchError;
use crate::domain::fundamentals::Fundamentals;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::watchlist::{Classification, WatchlistEntry};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::watchlist_port::WatchlistPort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, params};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS ohlcv (
        ticker TEXT NOT NULL,
        date TEXT NOT NULL,
        open REAL NOT NULL,
        high REAL NOT NULL,
        low REAL NOT NULL,
        close REAL NOT NULL,
        volume INTEGER NOT NULL,
        PRIMARY KEY (ticker, date)
    );
    CREATE TABLE IF NOT EXISTS fundamentals (
        ticker TEXT PRIMARY KEY,
        live_price REAL,
        debt_to_equity REAL,
        dividend_yield REAL
    );
    CREATE TABLE IF NOT EXISTS watchlist (
        position INTEGER PRIMARY KEY AUTOINCREMENT,
        ticker TEXT NOT NULL UNIQUE,
        fair_value REAL,
        tag TEXT
    );";

fn query_err(e: rusqlite::Error) -> StockwatchError {
    StockwatchError::DatabaseQuery {
        reason: e.to_string(),
    }
}

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockwatchError> {
        let db_path = config
            .get_string("sqlite", "path")
            .ok_or_else(|| StockwatchError::missing("sqlite", "path"))?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| StockwatchError::Database {
                reason: e.to_string(),
            })?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, StockwatchError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| StockwatchError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StockwatchError> {
        self.pool.get().map_err(|e: r2d2::Error| StockwatchError::Database {
            reason: e.to_string(),
        })
    }

    pub fn initialize_schema(&self) -> Result<(), StockwatchError> {
        self.conn()?.execute_batch(SCHEMA).map_err(query_err)
    }

    pub fn insert_bars(&self, bars: &[OhlcvBar]) -> Result<(), StockwatchError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        for bar in bars {
            tx.execute(
                "INSERT OR REPLACE INTO ohlcv (ticker, date, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    bar.ticker,
                    bar.date.format("%Y-%m-%d").to_string(),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)
    }

    pub fn upsert_fundamentals(&self, ticker: &str, fundamentals: &Fundamentals) -> Result<(), StockwatchError> {
        self.conn()?
            .execute(
                "INSERT OR REPLACE INTO fundamentals (ticker, live_price, debt_to_equity, dividend_yield)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    ticker,
                    fundamentals.live_price,
                    fundamentals.debt_to_equity,
                    fundamentals.dividend_yield
                ],
            )
            .map_err(query_err)?;
        Ok(())
    }

    /// Adds an entry, or updates fair value and tag of an existing ticker
    /// without moving it in the list.
    pub fn upsert_watchlist_entry(&self, entry: &WatchlistEntry) -> Result<(), StockwatchError> {
        self.conn()?
            .execute(
                "INSERT INTO watchlist (ticker, fair_value, tag) VALUES (?1, ?2, ?3)
                 ON CONFLICT(ticker) DO UPDATE SET fair_value = excluded.fair_value, tag = excluded.tag",
                params![
                    entry.ticker.to_uppercase(),
                    entry.fair_value,
                    entry.tag.as_ref().map(|t| t.to_string())
                ],
            )
            .map_err(query_err)?;
        Ok(())
    }

    /// Returns whether a row was removed.
    pub fn delete_watchlist_entry(&self, ticker: &str) -> Result<bool, StockwatchError> {
        let removed = self
            .conn()?
            .execute(
                "DELETE FROM watchlist WHERE ticker = ?1",
                params![ticker.to_uppercase()],
            )
            .map_err(query_err)?;
        Ok(removed > 0)
    }
}

fn parse_date(date_str: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(date_str.len(), rusqlite::types::Type::Text, Box::new(e))
    })
}

impl DataPort for SqliteAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockwatchError> {
        let conn = self.conn()?;

        let start_str = start_date.format("%Y-%m-%d").to_string();
        let end_str = end_date.format("%Y-%m-%d").to_string();

        let mut stmt = conn
            .prepare(
                "SELECT ticker, date, open, high, low, close, volume
                 FROM ohlcv
                 WHERE ticker = ?1 AND date >= ?2 AND date <= ?3
                 ORDER BY date ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![ticker, start_str, end_str], |row| {
                Ok(OhlcvBar {
                    ticker: row.get(0)?,
                    date: parse_date(row.get(1)?)?,
                    open: row.get(2)?,
                    high: row.get(3)?,
                    low: row.get(4)?,
                    close: row.get(5)?,
                    volume: row.get(6)?,
                })
            })
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn fetch_fundamentals(&self, ticker: &str) -> Result<Fundamentals, StockwatchError> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT live_price, debt_to_equity, dividend_yield FROM fundamentals WHERE ticker = ?1",
                params![ticker],
                |row| {
                    Ok(Fundamentals {
                        live_price: row.get(0)?,
                        debt_to_equity: row.get(1)?,
                        dividend_yield: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(query_err)?;
        Ok(found.unwrap_or_default())
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockwatchError> {
        let conn = self.conn()?;

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM ohlcv WHERE ticker = ?1",
                params![ticker],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_err)?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => {
                let min = parse_date(min_str).map_err(query_err)?;
                let max = parse_date(max_str).map_err(query_err)?;
                Ok(Some((min, max, count as usize)))
            }
            _ => Ok(None),
        }
    }
}

impl WatchlistPort for SqliteAdapter {
    fn load_watchlist(&self) -> Result<Vec<WatchlistEntry>, StockwatchError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT ticker, fair_value, tag FROM watchlist ORDER BY position ASC")
            .map_err(query_err)?;

        let rows = stmt
            .query_map([], |row| {
                let tag: Option<String> = row.get(2)?;
                Ok(WatchlistEntry {
                    ticker: row.get(0)?,
                    fair_value: row.get::<_, Option<f64>>(1)?.filter(|v| *v > 0.0),
                    tag: tag.as_deref().and_then(Classification::parse),
                })
            })
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }
}
