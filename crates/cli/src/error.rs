//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded or validated
    #[error("Failed to load configuration: {0}")]
    Config(#[from] contracts::ContractError),

    /// Destinations could not be built from the configuration
    #[error("Failed to build destinations: {0}")]
    Setup(#[from] dispatcher::DispatcherError),

    /// Input could not be opened or read
    #[error("Failed to read input {path}: {message}")]
    Input { path: String, message: String },

    /// A destination failed to flush
    #[error("Failed to flush destinations: {message}")]
    Flush { message: String },

    /// A batch failed and the run was not asked to continue
    #[error("Batch {batch} failed: {message}")]
    BatchFailed { batch: u64, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn input(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Input {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn flush(message: impl Into<String>) -> Self {
        Self::Flush {
            message: message.into(),
        }
    }

    pub fn batch_failed(batch: u64, message: impl Into<String>) -> Self {
        Self::BatchFailed {
            batch,
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Load a configuration file, reporting a missing file distinctly
pub fn load_config(path: &std::path::Path) -> Result<contracts::FanoutConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }
    Ok(config_loader::ConfigLoader::load_from_path(path)?)
}
