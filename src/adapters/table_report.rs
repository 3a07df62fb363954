//! Plain-text table report for the terminal.

use std::fmt::Write;

use crate::adapters::report_rows::{HEADERS, display_rows};
use crate::domain::error::StockwatchError;
use crate::domain::scan::ScanReport;
use crate::domain::signal::Signal;
use crate::ports::report_port::ReportPort;

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[derive(Debug, Default)]
pub struct TableReportAdapter;

impl TableReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for TableReportAdapter {
    fn render(&self, report: &ScanReport) -> Result<String, StockwatchError> {
        let rows = display_rows(report);

        let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(&row.cells) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let _ = writeln!(out, "Watchlist as of {}", report.as_of);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", pad_line(HEADERS.iter().copied(), &widths));
        let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let _ = writeln!(out, "{}", "-".repeat(total));
        for row in &rows {
            let _ = writeln!(out, "{}", pad_line(row.cells.iter().map(String::as_str), &widths));
        }

        let notes: Vec<String> = rows
            .iter()
            .filter_map(|r| r.note.as_ref().map(|n| format!("  {}: {}", r.cells[0], n)))
            .collect();
        if !notes.is_empty() {
            let _ = writeln!(out);
            for note in notes {
                let _ = writeln!(out, "{}", note);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} BUY, {} WATCH, {} WAIT, {} skipped",
            report.count_signal(Signal::Buy),
            report.count_signal(Signal::Watch),
            report.count_signal(Signal::Wait),
            report.skipped().count(),
        );

        Ok(out)
    }
}
