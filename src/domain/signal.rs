//! Signal classification: trend, volume shock, fair value, tranches and the
//! buy/watch/wait score.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
    InsufficientData,
}

impl Trend {
    /// Bullish iff price is strictly above the moving average.
    pub fn classify(price: f64, sma: Option<f64>) -> Self {
        match sma {
            Some(sma) if price > sma => Trend::Bullish,
            Some(_) => Trend::Bearish,
            None => Trend::InsufficientData,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bullish => write!(f, "bullish"),
            Trend::Bearish => write!(f, "bearish"),
            Trend::InsufficientData => write!(f, "insufficient data"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeShock {
    None,
    BuyingPressure,
    SellingPressure,
}

impl VolumeShock {
    /// A shock is a latest volume strictly above `multiplier` times the
    /// average. A flat or rising close counts as buying pressure.
    pub fn classify(volume_ratio: f64, multiplier: f64, price_change: f64) -> Self {
        if volume_ratio <= multiplier {
            VolumeShock::None
        } else if price_change >= 0.0 {
            VolumeShock::BuyingPressure
        } else {
            VolumeShock::SellingPressure
        }
    }

    pub fn is_shock(&self) -> bool {
        !matches!(self, VolumeShock::None)
    }
}

impl fmt::Display for VolumeShock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeShock::None => write!(f, "-"),
            VolumeShock::BuyingPressure => write!(f, "buying pressure"),
            VolumeShock::SellingPressure => write!(f, "selling pressure"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Wait,
    Watch,
    Buy,
}

impl Signal {
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => Signal::Wait,
            1 => Signal::Watch,
            _ => Signal::Buy,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Watch => write!(f, "WATCH"),
            Signal::Wait => write!(f, "WAIT"),
        }
    }
}

/// Fair value discounted by the margin of safety (in percent).
pub fn adjusted_fair_value(fair_value: f64, margin_of_safety_pct: f64) -> f64 {
    fair_value - fair_value * margin_of_safety_pct / 100.0
}

/// Inputs to the point score. `None` fields score nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreInputs {
    pub rsi: Option<f64>,
    pub rsi_buy_threshold: f64,
    pub current_correction: Option<f64>,
    pub average_correction: Option<f64>,
    pub price: f64,
    pub adjusted_fair_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub rsi_oversold: bool,
    pub deeper_than_usual: bool,
    pub below_fair_value: bool,
}

impl Score {
    pub fn evaluate(inputs: &ScoreInputs) -> Self {
        let rsi_oversold = inputs.rsi.is_some_and(|rsi| rsi < inputs.rsi_buy_threshold);
        let deeper_than_usual = match (inputs.current_correction, inputs.average_correction) {
            (Some(current), Some(average)) => current < average,
            _ => false,
        };
        let below_fair_value = inputs
            .adjusted_fair_value
            .is_some_and(|fair| inputs.price <= fair);

        Self {
            rsi_oversold,
            deeper_than_usual,
            below_fair_value,
        }
    }

    pub fn points(&self) -> u8 {
        u8::from(self.rsi_oversold) + u8::from(self.deeper_than_usual) + u8::from(self.below_fair_value)
    }

    pub fn signal(&self) -> Signal {
        Signal::from_score(self.points())
    }
}

/// A staged buy level `drop_pct` percent below the window high.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tranche {
    pub drop_pct: f64,
    pub level: f64,
    pub reached: bool,
}

pub fn tranche_levels(high: f64, price: f64, drops: &[f64]) -> Vec<Tranche> {
    drops
        .iter()
        .map(|&drop_pct| {
            let level = high - high * drop_pct / 100.0;
            Tranche {
                drop_pct,
                level,
                reached: price <= level,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_strictly_above_is_bullish() {
        assert_eq!(Trend::classify(101.0, Some(100.0)), Trend::Bullish);
        assert_eq!(Trend::classify(100.0, Some(100.0)), Trend::Bearish);
        assert_eq!(Trend::classify(99.0, Some(100.0)), Trend::Bearish);
        assert_eq!(Trend::classify(99.0, None), Trend::InsufficientData);
    }

    #[test]
    fn volume_shock_subclassified_by_price_change() {
        assert_eq!(VolumeShock::classify(2.0, 1.5, 0.5), VolumeShock::BuyingPressure);
        assert_eq!(VolumeShock::classify(2.0, 1.5, -0.5), VolumeShock::SellingPressure);
        assert_eq!(VolumeShock::classify(1.5, 1.5, 3.0), VolumeShock::None);
        assert!(!VolumeShock::None.is_shock());
    }

    #[test]
    fn score_maps_to_signal() {
        assert_eq!(Signal::from_score(0), Signal::Wait);
        assert_eq!(Signal::from_score(1), Signal::Watch);
        assert_eq!(Signal::from_score(2), Signal::Buy);
        assert_eq!(Signal::from_score(3), Signal::Buy);
    }

    #[test]
    fn margin_of_safety_boundary_counts_as_met() {
        let adjusted = adjusted_fair_value(100.0, 10.0);
        assert_eq!(adjusted, 90.0);
        let score = Score::evaluate(&ScoreInputs {
            price: 90.0,
            adjusted_fair_value: Some(adjusted),
            ..Default::default()
        });
        assert!(score.below_fair_value);
    }

    #[test]
    fn full_score_is_buy() {
        let score = Score::evaluate(&ScoreInputs {
            rsi: Some(30.0),
            rsi_buy_threshold: 45.0,
            current_correction: Some(-20.0),
            average_correction: Some(-15.0),
            price: 80.0,
            adjusted_fair_value: Some(90.0),
        });
        assert_eq!(score.points(), 3);
        assert_eq!(score.signal(), Signal::Buy);
    }

    #[test]
    fn missing_inputs_score_nothing() {
        let score = Score::evaluate(&ScoreInputs {
            rsi: None,
            rsi_buy_threshold: 45.0,
            current_correction: Some(-20.0),
            average_correction: None,
            price: 80.0,
            adjusted_fair_value: None,
        });
        assert_eq!(score.points(), 0);
        assert_eq!(score.signal(), Signal::Wait);
    }

    #[test]
    fn rsi_at_threshold_does_not_score() {
        let score = Score::evaluate(&ScoreInputs {
            rsi: Some(45.0),
            rsi_buy_threshold: 45.0,
            current_correction: Some(-10.0),
            average_correction: Some(-10.0),
            price: 100.0,
            adjusted_fair_value: Some(90.0),
        });
        assert_eq!(score.points(), 0);
    }

    #[test]
    fn single_point_is_watch() {
        let score = Score::evaluate(&ScoreInputs {
            rsi: Some(20.0),
            rsi_buy_threshold: 45.0,
            price: 100.0,
            ..Default::default()
        });
        assert_eq!(score.signal(), Signal::Watch);
    }

    #[test]
    fn tranches_below_high() {
        let tranches = tranche_levels(200.0, 165.0, &[10.0, 20.0, 30.0]);
        assert_eq!(tranches.len(), 3);
        assert_eq!(tranches[0].level, 180.0);
        assert!(tranches[0].reached);
        assert_eq!(tranches[1].level, 160.0);
        assert!(!tranches[1].reached);
        assert!(!tranches[2].reached);
    }

    #[test]
    fn signal_display() {
        assert_eq!(Signal::Buy.to_string(), "BUY");
        assert_eq!(Trend::InsufficientData.to_string(), "insufficient data");
        assert_eq!(VolumeShock::SellingPressure.to_string(), "selling pressure");
    }
}
