//! Error types for SHIPSmart
//!
//! This module defines the error types used throughout the assistant core,
//! using `thiserror` for ergonomic error handling. Local input validation
//! failures live in [`crate::nlp::ValidationError`]; everything else that can
//! go wrong (configuration, session bookkeeping, the remote completion
//! service) is a [`ShipsmartError`].

use thiserror::Error;

/// Main error type for SHIPSmart operations
///
/// The `Remote*` and [`ShipsmartError::MalformedResponse`] variants classify
/// failures at the completion-service boundary. The flow controller turns
/// them into a user-visible apology instead of propagating them.
#[derive(Error, Debug)]
pub enum ShipsmartError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session bookkeeping errors (streaming lifecycle violations, unknown ids)
    #[error("Session error: {0}")]
    Session(String),

    /// Missing credentials for the completion service
    #[error("Missing credentials: environment variable {0} is not set")]
    MissingCredentials(String),

    /// Completion service rejected the credentials (HTTP 401)
    #[error("Unauthorized. Please check your API key")]
    RemoteUnauthorized,

    /// Completion service throttled the request (HTTP 429)
    #[error("Rate limit exceeded. Please try again later")]
    RemoteRateLimited,

    /// Completion service answered with any other non-success status
    #[error("Server error (status code: {0})")]
    RemoteServerError(u16),

    /// Request never produced a response (connect, timeout, TLS)
    #[error("Network error: {0}")]
    RemoteNetwork(String),

    /// Response body could not be decoded as the expected JSON record
    #[error("Error parsing response: {0}")]
    RemoteDecoding(String),

    /// Response decoded but lacked the fields a reply needs
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ShipsmartError {
    /// Returns true for errors raised at the completion-service boundary
    ///
    /// # Examples
    ///
    /// ```
    /// use shipsmart::error::ShipsmartError;
    ///
    /// assert!(ShipsmartError::RemoteRateLimited.is_remote());
    /// assert!(!ShipsmartError::Config("bad".to_string()).is_remote());
    /// ```
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteUnauthorized
                | Self::RemoteRateLimited
                | Self::RemoteServerError(_)
                | Self::RemoteNetwork(_)
                | Self::RemoteDecoding(_)
                | Self::MalformedResponse(_)
        )
    }
}

/// Result type alias for SHIPSmart operations
///
/// Uses `anyhow::Error` so callers can attach context while still being able
/// to `downcast_ref::<ShipsmartError>()` when they need to classify a failure.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ShipsmartError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_server_error_display_includes_status() {
        let error = ShipsmartError::RemoteServerError(503);
        assert_eq!(error.to_string(), "Server error (status code: 503)");
    }

    #[test]
    fn test_missing_credentials_display() {
        let error = ShipsmartError::MissingCredentials("SHIPSMART_API_KEY".to_string());
        assert!(error.to_string().contains("SHIPSMART_API_KEY"));
    }

    #[test]
    fn test_remote_classification() {
        assert!(ShipsmartError::RemoteUnauthorized.is_remote());
        assert!(ShipsmartError::RemoteNetwork("reset".to_string()).is_remote());
        assert!(ShipsmartError::MalformedResponse("no choices".to_string()).is_remote());
        assert!(!ShipsmartError::Session("x".to_string()).is_remote());
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = ShipsmartError::RemoteRateLimited.into();
        assert!(matches!(
            err.downcast_ref::<ShipsmartError>(),
            Some(ShipsmartError::RemoteRateLimited)
        ));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ShipsmartError = io_error.into();
        assert!(matches!(error, ShipsmartError::Io(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: ShipsmartError = yaml_error.into();
        assert!(matches!(error, ShipsmartError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ShipsmartError>();
    }
}
