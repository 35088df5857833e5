//! Error types for the logging bridge

use std::time::Duration;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend did not confirm delivery in time
    #[error("Backend flush did not complete within {timeout:?}")]
    SyncTimeout { timeout: Duration },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    Writer(String),

    /// The process-wide bridge was installed twice
    #[error("Logging bridge already initialized")]
    AlreadyInitialized,
}

impl BridgeError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        BridgeError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn sync_timeout(timeout: Duration) -> Self {
        BridgeError::SyncTimeout { timeout }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        BridgeError::Writer(msg.into())
    }

    /// Whether this error reports a backend flush that ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, BridgeError::SyncTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BridgeError::config("LocalSinkConfig", "empty timestamp pattern");
        assert!(matches!(err, BridgeError::InvalidConfiguration { .. }));

        let err = BridgeError::sync_timeout(Duration::from_millis(250));
        assert!(err.is_timeout());

        let err = BridgeError::writer("closed");
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_error_display() {
        let err = BridgeError::config("BridgeConfig", "unknown level 'loud'");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for BridgeConfig: unknown level 'loud'"
        );

        let err = BridgeError::sync_timeout(Duration::from_secs(3));
        assert_eq!(err.to_string(), "Backend flush did not complete within 3s");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = BridgeError::io_operation("opening log file", "/var/log/app.log", io_err);

        assert!(matches!(err, BridgeError::IoOperation { .. }));
        assert!(err.to_string().contains("opening log file"));
        assert!(err.to_string().contains("/var/log/app.log"));
    }
}
