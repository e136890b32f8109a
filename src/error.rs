//! Error types for sud.

use thiserror::Error;

/// Result type alias for sud.
pub type Result<T> = std::result::Result<T, SudError>;

/// Errors raised while reconciling the managed A record.
#[derive(Error, Debug)]
pub enum SudError {
    /// Hostname cannot be split into a record name and a zone.
    #[error("Invalid hostname '{hostname}': {reason}")]
    InvalidHostname {
        hostname: String,
        reason: &'static str,
    },

    /// Public address could not be determined.
    #[error("Cannot determine current public ip address: {0}")]
    AddressDiscovery(String),

    /// Existing A record could not be fetched.
    #[error("Cannot retrieve information for A record '{name}' from zone '{domain}': {message}")]
    RecordLookup {
        name: String,
        domain: String,
        message: String,
    },

    /// A record could not be created or changed.
    #[error("Cannot update A record '{name}' in zone '{domain}': {message}")]
    RecordUpdate {
        name: String,
        domain: String,
        message: String,
    },

    /// Notification could not be delivered.
    #[error("Notification failed: {0}")]
    Notification(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SudError {
    pub(crate) fn invalid_hostname(hostname: &str, reason: &'static str) -> Self {
        SudError::InvalidHostname {
            hostname: hostname.to_string(),
            reason,
        }
    }
}

impl From<toml::de::Error> for SudError {
    fn from(e: toml::de::Error) -> Self {
        SudError::Config(format!("Invalid configuration file: {}", e.message()))
    }
}

impl From<toml::ser::Error> for SudError {
    fn from(e: toml::ser::Error) -> Self {
        SudError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for SudError {
    fn from(e: serde_json::Error) -> Self {
        SudError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_message_quotes_name_and_zone() {
        let err = SudError::RecordLookup {
            name: "my".to_string(),
            domain: "host.name".to_string(),
            message: "HTTP 403 Forbidden".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot retrieve information for A record 'my' from zone 'host.name': HTTP 403 Forbidden"
        );
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let err: SudError = toml::from_str::<toml::Value>("hostname = ").unwrap_err().into();
        assert!(matches!(err, SudError::Config(_)));
        assert!(err.to_string().contains("Invalid configuration file"));
    }
}
