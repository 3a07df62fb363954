//! Watchlist entries and sheet parsing.
//!
//! A watchlist sheet is any table with a `Ticker` column. Header names are
//! trimmed and matched case-insensitively; optional `FairValue` and `Tag`
//! columns carry the user's estimates.

use log::warn;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Bought in stages as the price falls through tranche levels.
    Tranche,
    /// Bought on a fixed schedule regardless of price.
    RecurringBuy,
    Other(String),
}

impl Classification {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.to_lowercase().as_str() {
            "tranche" | "tranchen" => Classification::Tranche,
            "recurring-buy" | "recurring" | "sparplan" => Classification::RecurringBuy,
            _ => Classification::Other(trimmed.to_string()),
        })
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Tranche => write!(f, "tranche"),
            Classification::RecurringBuy => write!(f, "recurring-buy"),
            Classification::Other(tag) => write!(f, "{}", tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistEntry {
    pub ticker: String,
    pub fair_value: Option<f64>,
    pub tag: Option<Classification>,
}

impl WatchlistEntry {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            fair_value: None,
            tag: None,
        }
    }

    pub fn with_fair_value(mut self, fair_value: f64) -> Self {
        self.fair_value = Some(fair_value);
        self
    }

    pub fn with_tag(mut self, tag: Classification) -> Self {
        self.tag = Some(tag);
        self
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum WatchlistError {
    #[error("watchlist has no 'Ticker' column")]
    MissingTickerColumn,

    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),

    #[error("watchlist is empty")]
    Empty,
}

/// Parses a comma-separated ticker override such as `"sap, msft"`.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, WatchlistError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(WatchlistError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(WatchlistError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

/// Column positions of a watchlist sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub ticker: usize,
    pub fair_value: Option<usize>,
    pub tag: Option<usize>,
}

impl SheetLayout {
    pub fn detect(headers: &[String]) -> Result<Self, WatchlistError> {
        let ticker = find_column(headers, &["ticker"]).ok_or(WatchlistError::MissingTickerColumn)?;
        Ok(Self {
            ticker,
            fair_value: find_column(headers, &["fairvalue", "fair_value", "fair value"]),
            tag: find_column(headers, &["tag", "type", "classification"]),
        })
    }
}

/// Builds entries from sheet rows.
///
/// Blank ticker cells are dropped. A repeated ticker keeps its first row.
/// Fair values that are not positive numbers are treated as absent.
pub fn entries_from_rows<I, R>(headers: &[String], rows: I) -> Result<Vec<WatchlistEntry>, WatchlistError>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    let layout = SheetLayout::detect(headers)?;
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    for row in rows {
        let row = row.as_ref();
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(|s| s.trim());

        let ticker = match cell(Some(layout.ticker)) {
            Some(t) if !t.is_empty() => t.to_uppercase(),
            _ => continue,
        };
        if !seen.insert(ticker.clone()) {
            warn!("duplicate watchlist ticker {} ignored", ticker);
            continue;
        }

        let fair_value = cell(layout.fair_value)
            .and_then(|v| v.replace(',', ".").parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0);
        let tag = cell(layout.tag).and_then(Classification::parse);

        entries.push(WatchlistEntry {
            ticker,
            fair_value,
            tag,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_tickers_basic() {
        assert_eq!(parse_tickers("SAP,MSFT,ASML").unwrap(), vec!["SAP", "MSFT", "ASML"]);
    }

    #[test]
    fn test_parse_tickers_whitespace_and_case() {
        assert_eq!(parse_tickers("  sap , msft ").unwrap(), vec!["SAP", "MSFT"]);
    }

    #[test]
    fn test_parse_tickers_empty_token() {
        assert!(matches!(parse_tickers("SAP,,MSFT"), Err(WatchlistError::EmptyToken)));
    }

    #[test]
    fn test_parse_tickers_duplicate() {
        let result = parse_tickers("SAP,MSFT,sap");
        assert!(matches!(result, Err(WatchlistError::DuplicateTicker(s)) if s == "SAP"));
    }

    #[test]
    fn ticker_column_found_case_insensitively_after_trim() {
        let headers = strings(&["Name", "  TICKER ", "Fair Value"]);
        let layout = SheetLayout::detect(&headers).unwrap();
        assert_eq!(layout.ticker, 1);
        assert_eq!(layout.fair_value, Some(2));
        assert_eq!(layout.tag, None);
    }

    #[test]
    fn missing_ticker_column() {
        let headers = strings(&["Symbol", "Price"]);
        assert!(matches!(
            SheetLayout::detect(&headers),
            Err(WatchlistError::MissingTickerColumn)
        ));
    }

    #[test]
    fn entries_drop_blank_and_duplicate_tickers() {
        let headers = strings(&["Ticker", "FairValue", "Tag"]);
        let rows = vec![
            strings(&["sap", "150", "tranche"]),
            strings(&["", "10", ""]),
            strings(&["MSFT", "not a number", "Sparplan"]),
            strings(&["SAP", "999", ""]),
        ];
        let entries = entries_from_rows(&headers, rows).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            WatchlistEntry::new("SAP")
                .with_fair_value(150.0)
                .with_tag(Classification::Tranche)
        );
        assert_eq!(entries[1].ticker, "MSFT");
        assert_eq!(entries[1].fair_value, None);
        assert_eq!(entries[1].tag, Some(Classification::RecurringBuy));
    }

    #[test]
    fn fair_value_accepts_decimal_comma() {
        let headers = strings(&["Ticker", "fair_value"]);
        let rows = vec![strings(&["ALV", "245,50"])];
        let entries = entries_from_rows(&headers, rows).unwrap();
        assert_eq!(entries[0].fair_value, Some(245.5));
    }

    #[test]
    fn short_rows_are_tolerated() {
        let headers = strings(&["Ticker", "FairValue", "Tag"]);
        let rows = vec![strings(&["SAP"])];
        let entries = entries_from_rows(&headers, rows).unwrap();
        assert_eq!(entries, vec![WatchlistEntry::new("SAP")]);
    }

    #[test]
    fn classification_parse() {
        assert_eq!(Classification::parse(" Tranche "), Some(Classification::Tranche));
        assert_eq!(Classification::parse("recurring-buy"), Some(Classification::RecurringBuy));
        assert_eq!(
            Classification::parse("core"),
            Some(Classification::Other("core".to_string()))
        );
        assert_eq!(Classification::parse("  "), None);
    }
}
