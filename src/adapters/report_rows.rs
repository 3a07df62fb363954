//! Display formatting shared by the table and HTML reports.

use crate::domain::scan::{ScanReport, ScanRow};
use crate::domain::signal::{Signal, Trend};

pub const NOT_AVAILABLE: &str = "n/a";

pub const HEADERS: [&str; 13] = [
    "Ticker", "Tag", "Price", "High", "Corr.", "Avg corr.", "RSI", "Trend", "Debt/Eq", "Div.",
    "Volume", "Fair (MoS)", "Signal",
];

/// One report row with every cell already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub cells: Vec<String>,
    /// CSS-style class for the signal cell: `buy`, `watch`, `wait` or `skipped`.
    pub signal_class: &'static str,
    pub trend_class: &'static str,
    pub note: Option<String>,
}

pub fn fmt_num(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}%", v),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn signal_class(signal: Signal) -> &'static str {
    match signal {
        Signal::Buy => "buy",
        Signal::Watch => "watch",
        Signal::Wait => "wait",
    }
}

fn trend_class(trend: Trend) -> &'static str {
    match trend {
        Trend::Bullish => "bullish",
        Trend::Bearish => "bearish",
        Trend::InsufficientData => "neutral",
    }
}

pub fn display_row(row: &ScanRow) -> DisplayRow {
    let entry = row.entry();
    let tag = entry.tag.as_ref().map(|t| t.to_string()).unwrap_or_default();

    match row {
        ScanRow::Ready { snapshot: s, .. } => {
            let volume = match s.volume_ratio {
                Some(ratio) if s.volume_shock.is_shock() => {
                    format!("{:.1}x {}", ratio, s.volume_shock)
                }
                Some(ratio) => format!("{:.1}x", ratio),
                None => NOT_AVAILABLE.to_string(),
            };
            let fair = match (s.fair_value, s.adjusted_fair_value) {
                (Some(fv), Some(adj)) => format!("{:.2} ({:.2})", fv, adj),
                _ => NOT_AVAILABLE.to_string(),
            };
            let reached: Vec<String> = s
                .tranches
                .iter()
                .filter(|t| t.reached)
                .map(|t| format!("-{:.0}%", t.drop_pct))
                .collect();
            let note = (!reached.is_empty()).then(|| format!("tranches reached: {}", reached.join(" ")));

            DisplayRow {
                cells: vec![
                    s.ticker.clone(),
                    tag,
                    format!("{:.2}", s.price),
                    fmt_num(s.all_time_high, 2),
                    fmt_pct(s.current_correction),
                    fmt_pct(s.average_correction),
                    fmt_num(s.rsi, 1),
                    s.trend.to_string(),
                    fmt_num(s.debt_ratio, 2),
                    fmt_pct(s.dividend_yield.map(|y| y * 100.0)),
                    volume,
                    fair,
                    format!("{} {}/3", s.signal, s.score.points()),
                ],
                signal_class: signal_class(s.signal),
                trend_class: trend_class(s.trend),
                note,
            }
        }
        ScanRow::Skipped { reason, .. } => {
            let mut cells = vec![NOT_AVAILABLE.to_string(); HEADERS.len()];
            cells[0] = entry.ticker.clone();
            cells[1] = tag;
            cells[HEADERS.len() - 1] = "-".to_string();
            DisplayRow {
                cells,
                signal_class: "skipped",
                trend_class: "neutral",
                note: Some(reason.to_string()),
            }
        }
    }
}

pub fn display_rows(report: &ScanReport) -> Vec<DisplayRow> {
    report.rows.iter().map(display_row).collect()
}
