//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use std::fmt;
use std::path::Path;

use contracts::{ContractError, PoolConfig};
use serde::de::DeserializeOwned;

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式 (大小写不敏感)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// 从文件路径推断格式
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml => write!(f, "TOML"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<PoolConfig, ContractError> {
    parse(content, ConfigFormat::Toml)
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<PoolConfig, ContractError> {
    parse(content, ConfigFormat::Json)
}

/// 根据格式解析配置
pub fn parse<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> Result<T, ContractError> {
    let result: Result<T, Box<dyn std::error::Error + Send + Sync>> = match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(Into::into),
        ConfigFormat::Json => serde_json::from_str(content).map_err(Into::into),
    };

    result.map_err(|e| ContractError::ConfigParse {
        message: format!("{format} parse error: {e}"),
        source: Some(e),
    })
}
