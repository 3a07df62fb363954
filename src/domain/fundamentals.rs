//! Fundamental fields delivered alongside a price series.

use serde::Serialize;

/// Raw fundamentals for one ticker. Every field is optional: the provider
/// omits them freely, and a missing field only blanks the matching metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fundamentals {
    pub live_price: Option<f64>,
    /// Debt-to-equity as delivered, scale unknown (see [`normalize_debt_ratio`]).
    pub debt_to_equity: Option<f64>,
    pub dividend_yield: Option<f64>,
}

impl Fundamentals {
    pub fn live_price(&self) -> Option<f64> {
        self.live_price.filter(|p| p.is_finite() && *p > 0.0)
    }

    pub fn dividend_yield(&self) -> Option<f64> {
        self.dividend_yield.filter(|y| y.is_finite() && *y >= 0.0)
    }
}

/// Converts a raw debt-to-equity figure to a fractional ratio.
///
/// The provider delivers this value either as a fraction (`0.8`) or as a
/// percentage number (`80.0`) with no marker telling which. Values strictly
/// above `percent_threshold` are assumed to be percentages and divided by
/// 100; everything else is taken as already fractional.
///
/// This is a known approximation: a company with a genuine ratio above the
/// threshold (say 3.0 with a threshold of 2.0) is misread as 0.03.
pub fn normalize_debt_ratio(raw: Option<f64>, percent_threshold: f64) -> Option<f64> {
    let raw = raw.filter(|v| v.is_finite())?;
    if raw > percent_threshold {
        Some(raw / 100.0)
    } else {
        Some(raw)
    }
}
