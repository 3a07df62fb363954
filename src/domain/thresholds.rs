//! Threshold configuration for the indicator engine.
//!
//! Read from the `[thresholds]` section and validated before any scan runs.

use crate::domain::error::StockwatchError;
use crate::ports::config_port::ConfigPort;
use serde::Serialize;

const SECTION: &str = "thresholds";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thresholds {
    pub rsi_period: usize,
    /// RSI strictly below this scores a point.
    pub rsi_buy_threshold: f64,
    pub sma_period: usize,
    /// Discount on the fair value, in percent.
    pub margin_of_safety_pct: f64,
    /// Drops below the window high, in percent, ascending.
    pub tranche_drops: Vec<f64>,
    /// Calendar days of history retained before computing.
    pub lookback_days: u32,
    pub volume_period: usize,
    pub volume_shock_multiplier: f64,
    pub debt_percent_threshold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_buy_threshold: 45.0,
            sma_period: 200,
            margin_of_safety_pct: 10.0,
            tranche_drops: vec![10.0, 20.0, 30.0],
            lookback_days: 730,
            volume_period: 20,
            volume_shock_multiplier: 1.5,
            debt_percent_threshold: 2.0,
        }
    }
}

impl Thresholds {
    /// Builds thresholds from config, falling back to defaults per key.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockwatchError> {
        let defaults = Self::default();

        let tranche_drops = match config.get_string(SECTION, "tranche_drops") {
            Some(raw) => parse_tranche_drops(&raw)?,
            None => defaults.tranche_drops.clone(),
        };

        let thresholds = Self {
            rsi_period: read_period(config, "rsi_period", defaults.rsi_period)?,
            rsi_buy_threshold: config.get_double(SECTION, "rsi_buy_threshold", defaults.rsi_buy_threshold),
            sma_period: read_period(config, "sma_period", defaults.sma_period)?,
            margin_of_safety_pct: config.get_double(
                SECTION,
                "margin_of_safety_pct",
                defaults.margin_of_safety_pct,
            ),
            tranche_drops,
            lookback_days: {
                let days = config.get_int(SECTION, "lookback_days", i64::from(defaults.lookback_days));
                u32::try_from(days).map_err(|_| {
                    StockwatchError::invalid(SECTION, "lookback_days", "lookback_days must be a positive day count")
                })?
            },
            volume_period: read_period(config, "volume_period", defaults.volume_period)?,
            volume_shock_multiplier: config.get_double(
                SECTION,
                "volume_shock_multiplier",
                defaults.volume_shock_multiplier,
            ),
            debt_percent_threshold: config.get_double(
                SECTION,
                "debt_percent_threshold",
                defaults.debt_percent_threshold,
            ),
        };

        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), StockwatchError> {
        if self.rsi_period < 1 {
            return Err(StockwatchError::invalid(SECTION, "rsi_period", "rsi_period must be at least 1"));
        }
        if !(0.0..=100.0).contains(&self.rsi_buy_threshold) {
            return Err(StockwatchError::invalid(
                SECTION,
                "rsi_buy_threshold",
                "rsi_buy_threshold must be between 0 and 100",
            ));
        }
        if self.sma_period < 1 {
            return Err(StockwatchError::invalid(SECTION, "sma_period", "sma_period must be at least 1"));
        }
        if !(0.0..100.0).contains(&self.margin_of_safety_pct) {
            return Err(StockwatchError::invalid(
                SECTION,
                "margin_of_safety_pct",
                "margin_of_safety_pct must be in [0, 100)",
            ));
        }
        if self.lookback_days < 1 {
            return Err(StockwatchError::invalid(
                SECTION,
                "lookback_days",
                "lookback_days must be at least 1",
            ));
        }
        if self.volume_period < 1 {
            return Err(StockwatchError::invalid(
                SECTION,
                "volume_period",
                "volume_period must be at least 1",
            ));
        }
        if !(self.volume_shock_multiplier > 0.0) {
            return Err(StockwatchError::invalid(
                SECTION,
                "volume_shock_multiplier",
                "volume_shock_multiplier must be positive",
            ));
        }
        if !(self.debt_percent_threshold >= 0.0) {
            return Err(StockwatchError::invalid(
                SECTION,
                "debt_percent_threshold",
                "debt_percent_threshold must be non-negative",
            ));
        }
        Ok(())
    }
}

fn read_period(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, StockwatchError> {
    let value = config.get_int(SECTION, key, default as i64);
    usize::try_from(value)
        .ok()
        .filter(|v| *v >= 1)
        .ok_or_else(|| StockwatchError::invalid(SECTION, key, format!("{} must be at least 1", key)))
}

/// Parses `"10, 20, 30"` into ascending drop percentages in (0, 100).
pub fn parse_tranche_drops(input: &str) -> Result<Vec<f64>, StockwatchError> {
    let mut drops = Vec::new();
    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value: f64 = trimmed.parse().map_err(|_| {
            StockwatchError::invalid(SECTION, "tranche_drops", format!("'{}' is not a number", trimmed))
        })?;
        if !(value > 0.0 && value < 100.0) {
            return Err(StockwatchError::invalid(
                SECTION,
                "tranche_drops",
                format!("{} must be between 0 and 100 exclusive", value),
            ));
        }
        drops.push(value);
    }
    drops.sort_by(f64::total_cmp);
    drops.dedup();
    Ok(drops)
}
