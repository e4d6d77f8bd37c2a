//! Error types for CLI operations.

use std::path::PathBuf;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Task input could not be opened or read
    #[error("Failed to read task input {source_name}: {source}")]
    Input {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    /// Stream aborted on an invalid task
    #[error("Stream aborted on invalid task ({undelivered} tasks left undelivered): {message}")]
    StreamAborted { undelivered: usize, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn input(source_name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Input {
            source_name: source_name.into(),
            source,
        }
    }

    pub fn stream_aborted(undelivered: usize, message: impl Into<String>) -> Self {
        Self::StreamAborted {
            undelivered,
            message: message.into(),
        }
    }
}
