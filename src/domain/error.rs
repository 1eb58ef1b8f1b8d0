//! Domain error types.

/// Top-level error type for fincast.
///
/// Engine entry points are infallible: unavailable market data and degenerate
/// inputs produce well-defined result values. These errors only surface from
/// ports, adapters and configuration handling.
#[derive(Debug, thiserror::Error)]
pub enum FincastError {
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

    #[error("market data error: {reason}")]
    MarketData { reason: String },

    #[error("market data request for {ticker} timed out after {seconds}s")]
    Timeout { ticker: String, seconds: u64 },

    #[error("failed to parse records in {file}: {reason}")]
    RecordParse { file: String, reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FincastError> for std::process::ExitCode {
    fn from(err: &FincastError) -> Self {
        let code: u8 = match err {
            FincastError::Io(_) | FincastError::Report { .. } | FincastError::Json(_) => 1,
            FincastError::ConfigParse { .. }
            | FincastError::ConfigMissing { .. }
            | FincastError::ConfigInvalid { .. } => 2,
            FincastError::MarketData { .. } | FincastError::Timeout { .. } => 3,
            FincastError::RecordParse { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_missing_message() {
        let err = FincastError::ConfigMissing {
            section: "portfolio".into(),
            key: "holdings".into(),
        };
        assert_eq!(err.to_string(), "missing config key [portfolio] holdings");
    }

    #[test]
    fn timeout_message_names_ticker() {
        let err = FincastError::Timeout {
            ticker: "SPY".into(),
            seconds: 10,
        };
        assert_eq!(
            err.to_string(),
            "market data request for SPY timed out after 10s"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FincastError = io.into();
        assert!(matches!(err, FincastError::Io(_)));
    }
}
