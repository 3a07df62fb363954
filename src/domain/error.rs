//! Domain error types.

use crate::domain::watchlist::WatchlistError;

/// Top-level error type for stockwatch.
///
/// The indicator engine itself never produces one of these: missing data
/// inside a snapshot is reported per field. These errors come from the
/// collaborators around it (config, storage, rendering).
#[derive(Debug, thiserror::Error)]
pub enum StockwatchError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Watchlist(#[from] WatchlistError),

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockwatchError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        StockwatchError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(section: &str, key: &str) -> Self {
        StockwatchError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&StockwatchError> for std::process::ExitCode {
    fn from(err: &StockwatchError) -> Self {
        let code: u8 = match err {
            StockwatchError::Io(_) | StockwatchError::Report { .. } => 1,
            StockwatchError::ConfigParse { .. }
            | StockwatchError::ConfigMissing { .. }
            | StockwatchError::ConfigInvalid { .. } => 2,
            StockwatchError::Database { .. } | StockwatchError::DatabaseQuery { .. } => 3,
            StockwatchError::Watchlist(_) => 4,
            StockwatchError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_invalid_message_names_section_and_key() {
        let err = StockwatchError::invalid("thresholds", "rsi_period", "must be at least 2");
        assert_eq!(
            err.to_string(),
            "invalid config value [thresholds] rsi_period: must be at least 2"
        );
    }

    #[test]
    fn watchlist_error_is_transparent() {
        let err = StockwatchError::from(WatchlistError::MissingTickerColumn);
        assert_eq!(err.to_string(), WatchlistError::MissingTickerColumn.to_string());
    }
}
