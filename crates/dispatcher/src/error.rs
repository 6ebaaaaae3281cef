//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// No factory registered for the store type
    #[error("unknown destination type '{store_type}' on store #{index}")]
    UnknownDestinationType { index: usize, store_type: String },

    /// Destination creation error
    #[error("failed to create destination '{name}': {message}")]
    DestinationCreation { name: String, message: String },

    /// Configuration or destination error (from contract)
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    /// Create a destination creation error
    pub fn destination_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DestinationCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
