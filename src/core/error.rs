//! Error taxonomy shared by the configuration, proxy client and normalizer

use thiserror::Error;

/// Errors that can occur while loading config or fetching quota data
#[derive(Debug, Error)]
pub enum QuotaError {
    /// Stored configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure, or the management server itself answered non-200
    #[error("Connection error: {0}")]
    Connection(String),

    /// The proxy call succeeded but the target API answered non-200
    #[error("Target API returned status {status}")]
    Upstream { status: u16 },

    /// Response body does not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for QuotaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            QuotaError::Connection(format!("request timed out: {}", err))
        } else {
            QuotaError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for QuotaError {
    fn from(err: serde_json::Error) -> Self {
        QuotaError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_becomes_parse_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(QuotaError::from(err), QuotaError::Parse(_)));
    }

    #[test]
    fn test_upstream_message_carries_status() {
        let err = QuotaError::Upstream { status: 429 };
        assert_eq!(err.to_string(), "Target API returned status 429");
    }
}
