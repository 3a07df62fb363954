//! Summary prompt for an external generative-language service.
//!
//! Only the prompt text is built here; sending it is left to the caller.

use std::fmt::Write;

use crate::domain::scan::ScanReport;

fn fmt_opt(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{:.1}{}", v, suffix),
        None => "n/a".to_string(),
    }
}

pub fn summary_prompt(report: &ScanReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "You are a cautious investment analyst. Summarise the watchlist below as of {} \
         in a few sentences per stock. Highlight BUY signals first, mention volume shocks, \
         and do not give personal financial advice.",
        report.as_of
    );
    let _ = writeln!(
        out,
        "Rules: RSI below {:.0} counts as oversold; margin of safety is {:.0}%.",
        report.thresholds.rsi_buy_threshold, report.thresholds.margin_of_safety_pct
    );
    out.push('\n');

    let mut snapshots: Vec<_> = report.snapshots().collect();
    snapshots.sort_by(|a, b| b.signal.cmp(&a.signal).then_with(|| a.ticker.cmp(&b.ticker)));

    for s in snapshots {
        let _ = writeln!(
            out,
            "- {}: price {:.2}, correction {} (typical {}), RSI {}, trend {}, debt/equity {}, volume {}, signal {} ({}/3)",
            s.ticker,
            s.price,
            fmt_opt(s.current_correction, "%"),
            fmt_opt(s.average_correction, "%"),
            fmt_opt(s.rsi, ""),
            s.trend,
            s.debt_ratio.map_or_else(|| "n/a".to_string(), |d| format!("{:.2}", d)),
            s.volume_shock,
            s.signal,
            s.score.points(),
        );
    }

    let skipped: Vec<&str> = report.skipped().map(|(e, _)| e.ticker.as_str()).collect();
    if !skipped.is_empty() {
        let _ = writeln!(out, "\nNo data was available for: {}.", skipped.join(", "));
    }

    out
}
