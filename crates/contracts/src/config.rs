//! PoolConfig - Config Loader 输出
//!
//! 描述一个任务池的完整配置：批大小、校验策略、输出处理器。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的任务池配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PoolConfig {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 分发器设置
    #[validate(nested)]
    pub dispatcher: DispatcherConfig,

    /// 批处理器配置
    #[validate(nested)]
    pub processor: ProcessorConfig,
}

/// 分发器配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatcherConfig {
    /// 每批任务数 (>= 1)
    #[validate(range(min = 1, message = "capacity must be >= 1"))]
    pub capacity: usize,

    /// 非法任务处理策略
    #[serde(default)]
    pub validation_policy: ValidationPolicy,

    /// DispatcherHandle 的输入队列容量
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1, message = "queue_capacity must be >= 1"))]
    pub queue_capacity: usize,
}

impl DispatcherConfig {
    /// 使用默认策略创建
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            validation_policy: ValidationPolicy::default(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_queue_capacity() -> usize {
    100
}

/// 非法任务处理策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// 终止整个流，缓冲区中的任务不再投递
    #[default]
    Abort,
    /// 记录警告并跳过该项，继续接收
    Skip,
}

/// 批处理器配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProcessorConfig {
    /// 处理器名称
    #[validate(length(min = 1, message = "processor name cannot be empty"))]
    pub name: String,

    /// 处理器类型
    pub processor_type: ProcessorType,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// 处理器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorType {
    /// 日志输出
    Log,
    /// 文件输出 (每批一个 JSON 文件)
    File,
}
