//! Core domain types and logic.

pub mod cache;
pub mod error;
pub mod fundamentals;
pub mod indicator;
pub mod ohlcv;
pub mod prompt;
pub mod scan;
pub mod signal;
pub mod snapshot;
pub mod thresholds;
pub mod watchlist;
