//! Simple Moving Average over closing prices.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) bars are invalid. A window holding a non-finite close
//! is invalid; later windows are unaffected.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::invalid(IndicatorType::Sma(period), bars.iter().map(|b| b.date));
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let mean = (i + 1 >= period)
                .then(|| &bars[i + 1 - period..=i])
                .filter(|window| window.iter().all(|b| b.close.is_finite()))
                .map(|window| window.iter().map(|b| b.close).sum::<f64>() / period as f64);
            IndicatorPoint {
                date: bar.date,
                valid: mean.is_some(),
                value: mean.unwrap_or(0.0),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                ticker: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn sma_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_sma(&bars, 3);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
    }

    #[test]
    fn sma_known_values() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&bars, 3);
        assert_abs_diff_eq!(series.values[2].value, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(series.values[3].value, 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(series.latest().unwrap(), 40.0, epsilon = 1e-9);
    }

    #[test]
    fn sma_insufficient_bars_has_no_latest() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 200);
        assert_eq!(series.values.len(), 2);
        assert_eq!(series.latest(), None);
    }

    #[test]
    fn sma_zero_period() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 0);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn sma_period_one_tracks_close() {
        let bars = make_bars(&[3.0, 7.0, 5.0]);
        let series = calculate_sma(&bars, 1);
        let values: Vec<f64> = series.valid_values().collect();
        assert_eq!(values, vec![3.0, 7.0, 5.0]);
    }

    #[test]
    fn sma_recovers_after_nan_leaves_window() {
        let bars = make_bars(&[1.0, f64::NAN, 3.0, 4.0, 5.0]);
        let series = calculate_sma(&bars, 2);
        assert!(!series.values[1].valid);
        assert!(!series.values[2].valid);
        assert!(series.values[3].valid);
        assert_abs_diff_eq!(series.latest().unwrap(), 4.5, epsilon = 1e-9);
    }

    #[test]
    fn sma_indicator_type() {
        let series = calculate_sma(&make_bars(&[1.0]), 200);
        assert_eq!(series.indicator_type, IndicatorType::Sma(200));
    }
}
