//! Error types for of-alert.

/// Top-level error type for a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub(crate) fn missing(key: &str, hint: &str) -> Self {
        Self::MissingRequired {
            key: key.to_string(),
            hint: hint.to_string(),
        }
    }

    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised while fetching or decoding the work-order sheet.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Sheet request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("Sheet endpoint {url} answered {status}")]
    BadStatus { url: String, status: u16 },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column {0:?} not found in sheet header")]
    UnknownColumn(String),
}

/// Errors raised while talking to the email provider.
///
/// A provider that answers with a non-success status is NOT an error here;
/// that is reported as a [`crate::delivery::DeliveryOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Email provider {provider} unreachable: {reason}")]
    Transport { provider: String, reason: String },
}

/// Result type alias for of-alert.
pub type Result<T> = std::result::Result<T, Error>;
