//! Indicator engine: one ticker's price series in, one [`MetricSnapshot`] out.
//!
//! The computation is pure. Every metric that cannot be computed from the
//! data at hand (too few bars, zero denominators, fields the provider did
//! not deliver) is `None` in the snapshot; only an empty series yields no
//! snapshot at all. Bars with a non-finite close are dropped before any
//! metric is computed.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::fundamentals::{Fundamentals, normalize_debt_ratio};
use crate::domain::indicator::drawdown::{average_drawdown, calculate_drawdown, highest_high, max_drawdown};
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::volume::calculate_volume_average;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::{
    Score, ScoreInputs, Signal, Tranche, Trend, VolumeShock, adjusted_fair_value, tranche_levels,
};
use crate::domain::thresholds::Thresholds;

const DAYS_PER_YEAR: u32 = 365;

/// Per-ticker inputs that do not come from the price series.
#[derive(Debug, Clone, Default)]
pub struct SnapshotInputs {
    pub fair_value: Option<f64>,
    pub fundamentals: Fundamentals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    pub ticker: String,
    pub as_of: NaiveDate,
    pub bars: usize,
    pub price: f64,
    pub all_time_high: Option<f64>,
    pub high_52w: Option<f64>,
    /// Percent below the window high; never positive for a price taken from
    /// the series itself.
    pub current_correction: Option<f64>,
    pub average_correction: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub rsi: Option<f64>,
    pub sma: Option<f64>,
    pub trend: Trend,
    pub debt_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub volume_shock: VolumeShock,
    pub fair_value: Option<f64>,
    pub adjusted_fair_value: Option<f64>,
    pub tranches: Vec<Tranche>,
    pub score: Score,
    pub signal: Signal,
}

/// A user fair value counts only when it is a positive finite number.
pub fn usable_fair_value(fair_value: Option<f64>) -> Option<f64> {
    fair_value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Computes a snapshot, or `None` when the series has no observations.
pub fn compute_snapshot(
    series: &PriceSeries,
    inputs: &SnapshotInputs,
    thresholds: &Thresholds,
) -> Option<MetricSnapshot> {
    let window = series.retain_window(thresholds.lookback_days).without_gaps();
    let bars = &window.bars;
    let last = window.last()?;

    let price = inputs.fundamentals.live_price().unwrap_or(last.close);

    let all_time_high = highest_high(bars);
    let high_52w = highest_high(window.trailing_days(DAYS_PER_YEAR));
    let current_correction = all_time_high
        .map(|ath| (price / ath - 1.0) * 100.0)
        .filter(|c| c.is_finite());

    let drawdowns = calculate_drawdown(bars);
    let average_correction = average_drawdown(&drawdowns);
    let max_drawdown = max_drawdown(&drawdowns);

    let rsi = calculate_rsi(bars, thresholds.rsi_period).latest();
    let sma = calculate_sma(bars, thresholds.sma_period).latest();
    let trend = Trend::classify(price, sma);

    let volume_ratio = calculate_volume_average(bars, thresholds.volume_period)
        .latest()
        .filter(|avg| *avg > 0.0)
        .map(|avg| last.volume as f64 / avg);
    let price_change = match bars.len() {
        n if n >= 2 => last.change_from(bars[n - 2].close),
        _ => 0.0,
    };
    let volume_shock = volume_ratio
        .map(|ratio| VolumeShock::classify(ratio, thresholds.volume_shock_multiplier, price_change))
        .unwrap_or(VolumeShock::None);

    let fair_value = usable_fair_value(inputs.fair_value);
    let adjusted_fair_value = fair_value.map(|fv| adjusted_fair_value(fv, thresholds.margin_of_safety_pct));

    let tranches = all_time_high
        .map(|ath| tranche_levels(ath, price, &thresholds.tranche_drops))
        .unwrap_or_default();

    let score = Score::evaluate(&ScoreInputs {
        rsi,
        rsi_buy_threshold: thresholds.rsi_buy_threshold,
        current_correction,
        average_correction,
        price,
        adjusted_fair_value,
    });

    Some(MetricSnapshot {
        ticker: series.ticker.clone(),
        as_of: last.date,
        bars: window.len(),
        price,
        all_time_high,
        high_52w,
        current_correction,
        average_correction,
        max_drawdown,
        rsi,
        sma,
        trend,
        debt_ratio: normalize_debt_ratio(
            inputs.fundamentals.debt_to_equity,
            thresholds.debt_percent_threshold,
        ),
        dividend_yield: inputs.fundamentals.dividend_yield(),
        volume_ratio,
        volume_shock,
        fair_value,
        adjusted_fair_value,
        tranches,
        signal: score.signal(),
        score,
    })
}
