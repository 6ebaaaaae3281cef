//! Layered error definitions
//!
//! Categorized by source: config / source / destination

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// A store block without its type identifier
    #[error("missing 'type' parameter on store #{index}")]
    MissingStoreType { index: usize },

    // ===== Source Errors =====
    /// The streaming batch source failed while being drained
    #[error("event source error: {message}")]
    Source { message: String },

    // ===== Destination Errors =====
    /// Destination write error
    #[error("destination '{destination}' write error: {message}")]
    DestinationWrite {
        destination: String,
        message: String,
    },

    /// Destination connection error
    #[error("destination '{destination}' connection error: {message}")]
    DestinationConnection {
        destination: String,
        message: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create event source error
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create destination write error
    pub fn destination_write(destination: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DestinationWrite {
            destination: destination.into(),
            message: message.into(),
        }
    }

    /// Create destination connection error
    pub fn destination_connection(
        destination: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::DestinationConnection {
            destination: destination.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised while loading configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse { .. } | Self::ConfigValidation { .. } | Self::MissingStoreType { .. }
        )
    }
}
