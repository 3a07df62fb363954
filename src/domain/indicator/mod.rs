//! Technical indicator series.
//!
//! Every indicator produces one [`IndicatorPoint`] per input bar. Points in
//! the warmup region are marked invalid rather than omitted, so indices line
//! up with the bars they were computed from.

pub mod drawdown;
pub mod rsi;
pub mod sma;
pub mod volume;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Drawdown,
    VolumeAverage(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub(crate) fn invalid(indicator_type: IndicatorType, dates: impl Iterator<Item = NaiveDate>) -> Self {
        Self {
            indicator_type,
            values: dates
                .map(|date| IndicatorPoint {
                    date,
                    valid: false,
                    value: 0.0,
                })
                .collect(),
        }
    }

    /// Value at the most recent bar, if it is past warmup and finite.
    pub fn latest(&self) -> Option<f64> {
        self.values
            .last()
            .filter(|p| p.valid && p.value.is_finite())
            .map(|p| p.value)
    }

    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter(|p| p.valid).map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Drawdown => write!(f, "DRAWDOWN"),
            IndicatorType::VolumeAverage(period) => write!(f, "VOLAVG({})", period),
        }
    }
}
