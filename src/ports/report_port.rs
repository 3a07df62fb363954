//! Report rendering port trait.

use crate::domain::error::StockwatchError;
use crate::domain::scan::ScanReport;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Port for rendering scan results.
pub trait ReportPort {
    fn render(&self, report: &ScanReport) -> Result<String, StockwatchError>;

    /// Default implementation: renders, then writes to `output_path` or to
    /// stdout when no path is given.
    fn write(&self, report: &ScanReport, output_path: Option<&Path>) -> Result<(), StockwatchError> {
        let content = self.render(report)?;
        match output_path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, content)?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}
