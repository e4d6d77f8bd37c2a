//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a `PoolConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("taskpool.toml")).unwrap();
//! println!("Batch capacity: {}", config.dispatcher.capacity);
//! ```

mod parser;
mod validator;

pub use contracts::PoolConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Detects the format from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - Unsupported format
    /// - File read failure
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<PoolConfig, ContractError> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            ContractError::config_parse(format!(
                "unsupported or missing config extension: {}",
                path.display()
            ))
        })?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<PoolConfig, ContractError> {
        let config = match format {
            ConfigFormat::Toml => parser::parse_toml(content)?,
            ConfigFormat::Json => parser::parse_json(content)?,
        };
        validator::validate(&config)?;
        Ok(config)
    }

    /// Validate an in-memory configuration (e.g. after CLI overrides)
    pub fn validate(config: &PoolConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    /// Serialize PoolConfig to TOML string
    pub fn to_toml(config: &PoolConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize PoolConfig to JSON string
    pub fn to_json(config: &PoolConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}
