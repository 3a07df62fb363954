//! Trailing average volume.
//!
//! VOLAVG(n)[i] = sum(V[i-j] for j in 0..n) / n, the window including bar i.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_volume_average(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::invalid(
            IndicatorType::VolumeAverage(period),
            bars.iter().map(|b| b.date),
        );
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let valid = i + 1 >= period;
            let value = if valid {
                bars[i + 1 - period..=i]
                    .iter()
                    .map(|b| b.volume as f64)
                    .sum::<f64>()
                    / period as f64
            } else {
                0.0
            };
            IndicatorPoint {
                date: bar.date,
                valid,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::VolumeAverage(period),
        values,
    }
}
