//! Drawdown of closing prices against their running maximum.
//!
//! DRAWDOWN[i] = (C[i] / max(C[0..=i]) - 1) * 100
//!
//! Values are percentages and never positive. A bar whose running maximum is
//! not positive is invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_drawdown(bars: &[OhlcvBar]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mut running_max = f64::NEG_INFINITY;

    for bar in bars {
        running_max = running_max.max(bar.close);
        let valid = running_max > 0.0 && bar.close.is_finite();
        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: if valid {
                (bar.close / running_max - 1.0) * 100.0
            } else {
                0.0
            },
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Drawdown,
        values,
    }
}

/// Mean drawdown over all valid points: the "typical" correction depth.
pub fn average_drawdown(series: &IndicatorSeries) -> Option<f64> {
    let (sum, count) = series
        .valid_values()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Deepest drawdown over all valid points.
pub fn max_drawdown(series: &IndicatorSeries) -> Option<f64> {
    series.valid_values().reduce(f64::min)
}

/// Highest high in `bars`, if any bar has a positive high.
pub fn highest_high(bars: &[OhlcvBar]) -> Option<f64> {
    bars.iter()
        .map(|b| b.high)
        .filter(|h| h.is_finite())
        .reduce(f64::max)
        .filter(|h| *h > 0.0)
}
