//! Watchlist scan: fetch each ticker's data, run the indicator engine and
//! collect one row per watchlist entry.
//!
//! A failing ticker never aborts the scan; it becomes a skipped row.

use chrono::{Duration, NaiveDate};
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use std::time::Instant;

use crate::domain::cache::{CacheKey, TtlCache};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::Signal;
use crate::domain::snapshot::{MetricSnapshot, SnapshotInputs, compute_snapshot, usable_fair_value};
use crate::domain::thresholds::Thresholds;
use crate::domain::watchlist::WatchlistEntry;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    NoData,
    FetchFailed { reason: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no data"),
            SkipReason::FetchFailed { reason } => write!(f, "fetch failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanRow {
    Ready {
        entry: WatchlistEntry,
        snapshot: MetricSnapshot,
    },
    Skipped {
        entry: WatchlistEntry,
        reason: SkipReason,
    },
}

impl ScanRow {
    pub fn entry(&self) -> &WatchlistEntry {
        match self {
            ScanRow::Ready { entry, .. } | ScanRow::Skipped { entry, .. } => entry,
        }
    }

    pub fn snapshot(&self) -> Option<&MetricSnapshot> {
        match self {
            ScanRow::Ready { snapshot, .. } => Some(snapshot),
            ScanRow::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub as_of: NaiveDate,
    pub thresholds: Thresholds,
    pub rows: Vec<ScanRow>,
}

impl ScanReport {
    pub fn snapshots(&self) -> impl Iterator<Item = &MetricSnapshot> {
        self.rows.iter().filter_map(ScanRow::snapshot)
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&WatchlistEntry, &SkipReason)> {
        self.rows.iter().filter_map(|row| match row {
            ScanRow::Skipped { entry, reason } => Some((entry, reason)),
            ScanRow::Ready { .. } => None,
        })
    }

    pub fn count_signal(&self, signal: Signal) -> usize {
        self.snapshots().filter(|s| s.signal == signal).count()
    }
}

pub struct Scanner<'a> {
    data_port: &'a dyn DataPort,
    thresholds: Thresholds,
    cache: TtlCache<MetricSnapshot>,
}

impl<'a> Scanner<'a> {
    pub fn new(data_port: &'a dyn DataPort, thresholds: Thresholds, cache_ttl: std::time::Duration) -> Self {
        Self {
            data_port,
            thresholds,
            cache: TtlCache::new(cache_ttl),
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Scans all entries as of `as_of`. `now` drives cache expiry.
    pub fn scan(&mut self, entries: &[WatchlistEntry], as_of: NaiveDate, now: Instant) -> ScanReport {
        let purged = self.cache.purge_expired(now);
        if purged > 0 {
            debug!("purged {} expired snapshots", purged);
        }

        let rows: Vec<ScanRow> = entries
            .iter()
            .map(|entry| self.scan_entry(entry, as_of, now))
            .collect();

        let ready = rows.iter().filter(|r| r.snapshot().is_some()).count();
        info!("scanned {} of {} tickers as of {}", ready, rows.len(), as_of);

        ScanReport {
            as_of,
            thresholds: self.thresholds.clone(),
            rows,
        }
    }

    fn scan_entry(&mut self, entry: &WatchlistEntry, as_of: NaiveDate, now: Instant) -> ScanRow {
        let key = CacheKey::new(entry.ticker.clone(), self.thresholds.lookback_days, as_of);
        if let Some(cached) = self.cache.get(&key, now) {
            debug!("{}: served from cache", entry.ticker);
            // The fair value is user data and may have changed since caching.
            if cached.fair_value == usable_fair_value(entry.fair_value) {
                return ScanRow::Ready {
                    entry: entry.clone(),
                    snapshot: cached.clone(),
                };
            }
        }

        let start = as_of - Duration::days(i64::from(self.thresholds.lookback_days));
        let bars = match self.data_port.fetch_ohlcv(&entry.ticker, start, as_of) {
            Ok(bars) => bars,
            Err(e) => {
                warn!("skipping {} ({})", entry.ticker, e);
                return ScanRow::Skipped {
                    entry: entry.clone(),
                    reason: SkipReason::FetchFailed {
                        reason: e.to_string(),
                    },
                };
            }
        };

        let fundamentals = self
            .data_port
            .fetch_fundamentals(&entry.ticker)
            .unwrap_or_else(|e| {
                warn!("{}: fundamentals unavailable ({})", entry.ticker, e);
                Default::default()
            });

        let series = PriceSeries::new(entry.ticker.clone(), bars);
        let inputs = SnapshotInputs {
            fair_value: entry.fair_value,
            fundamentals,
        };

        match compute_snapshot(&series, &inputs, &self.thresholds) {
            Some(snapshot) => {
                debug!("{}: {} bars, signal {}", entry.ticker, snapshot.bars, snapshot.signal);
                // A zero ttl turns caching off.
                if !self.cache.ttl().is_zero() {
                    self.cache.insert(key, snapshot.clone(), now);
                }
                ScanRow::Ready {
                    entry: entry.clone(),
                    snapshot,
                }
            }
            None => {
                warn!("skipping {} (no data found)", entry.ticker);
                ScanRow::Skipped {
                    entry: entry.clone(),
                    reason: SkipReason::NoData,
                }
            }
        }
    }
}
