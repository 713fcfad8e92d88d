//! Error types for GemChat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for GemChat operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, provider interactions, transcript storage,
/// and transcript uploads.
#[derive(Error, Debug)]
pub enum GemChatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, authentication, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Transcript storage errors (session file operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Uploaded transcript document rejected
    #[error("Upload rejected: {0}")]
    Upload(String),

    /// Missing API credential for the provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for GemChat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = GemChatError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_provider_error_display() {
        let error = GemChatError::Provider("API timeout".to_string());
        assert_eq!(error.to_string(), "Provider error: API timeout");
    }

    #[test]
    fn test_storage_error_display() {
        let error = GemChatError::Storage("session file unreadable".to_string());
        assert_eq!(error.to_string(), "Storage error: session file unreadable");
    }

    #[test]
    fn test_upload_error_display() {
        let error = GemChatError::Upload("missing 'messages' field".to_string());
        assert_eq!(error.to_string(), "Upload rejected: missing 'messages' field");
    }

    #[test]
    fn test_missing_credentials_error_display() {
        let error = GemChatError::MissingCredentials("gemini".to_string());
        assert_eq!(error.to_string(), "Missing credentials for provider: gemini");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: GemChatError = io_error.into();
        assert!(matches!(error, GemChatError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: GemChatError = json_error.into();
        assert!(matches!(error, GemChatError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: GemChatError = yaml_error.into();
        assert!(matches!(error, GemChatError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GemChatError>();
    }
}
