//! Error types for fleetmap

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum Error {
    /// Request never produced a response (connect failure, timeout, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `message` is whatever the server body explained.
    #[error("HTTP error! status: {status}{}", .message.as_deref().map(|m| format!(" - {m}")).unwrap_or_default())]
    Http { status: u16, message: Option<String> },

    /// Response decoded as JSON but a record is missing expected fields.
    #[error("Unexpected data shape: {0}")]
    DataShape(String),

    /// Geometry that cannot be drawn.
    #[error("Render error: {0}")]
    Render(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Failures of the round-trip itself; these are the ones polling retries.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Http { .. })
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display_with_message() {
        let err = Error::Http {
            status: 404,
            message: Some("Not Found - route 42".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 404 - Not Found - route 42");
    }

    #[test]
    fn test_http_error_display_without_message() {
        let err = Error::Http {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "HTTP error! status: 500");
        assert_eq!(err.http_status(), Some(500));
    }

    #[test]
    fn test_transport_classification() {
        assert!(Error::Network("timed out".into()).is_transport());
        assert!(!Error::DataShape("reading without truck".into()).is_transport());
        assert!(!Error::Config(ConfigError::NotFound).is_transport());
    }
}
