//! 配置校验模块
//!
//! 校验规则：
//! - capacity >= 1, queue_capacity >= 1 (derive)
//! - processor name 非空 (derive)
//! - file processor 的 base_path 若提供则非空

use contracts::{ContractError, PoolConfig, ProcessorType};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// 校验 PoolConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &PoolConfig) -> Result<(), ContractError> {
    config.validate().map_err(|errors| {
        let (field, message) = first_error(&errors, "")
            .unwrap_or_else(|| ("config".to_string(), errors.to_string()));
        ContractError::config_validation(field, message)
    })?;
    validate_processor_params(config)?;
    Ok(())
}

/// 按字段名排序后取第一个错误，保证输出稳定
fn first_error(errors: &ValidationErrors, prefix: &str) -> Option<(String, String)> {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (name, kind) in fields {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(err) = list.first() {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    return Some((path, message));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                if let Some(found) = first_error(inner, &path) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    if let Some(found) = first_error(inner, &format!("{path}[{idx}]")) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}

/// 校验处理器类型特定参数
fn validate_processor_params(config: &PoolConfig) -> Result<(), ContractError> {
    let processor = &config.processor;
    if processor.processor_type == ProcessorType::File {
        if let Some(base_path) = processor.params.get("base_path") {
            if base_path.trim().is_empty() {
                return Err(ContractError::config_validation(
                    "processor.params.base_path",
                    "base_path cannot be empty",
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ConfigVersion, DispatcherConfig, ProcessorConfig};
    use std::collections::HashMap;

    fn minimal_config() -> PoolConfig {
        PoolConfig {
            version: ConfigVersion::V1,
            dispatcher: DispatcherConfig::with_capacity(2),
            processor: ProcessorConfig {
                name: "console".into(),
                processor_type: ProcessorType::Log,
                params: HashMap::new(),
            },
        }
    }

    fn field_of(err: ContractError) -> String {
        match err {
            ContractError::ConfigValidation { field, .. } => field,
            other => panic!("expected ConfigValidation, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&minimal_config()).is_ok());
    }

    #[test]
    fn test_zero_capacity() {
        let mut config = minimal_config();
        config.dispatcher.capacity = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("capacity must be >= 1"), "got: {err}");
        assert_eq!(field_of(err), "dispatcher.capacity");
    }

    #[test]
    fn test_zero_queue_capacity() {
        let mut config = minimal_config();
        config.dispatcher.queue_capacity = 0;
        let err = validate(&config).unwrap_err();
        assert_eq!(field_of(err), "dispatcher.queue_capacity");
    }

    #[test]
    fn test_empty_processor_name() {
        let mut config = minimal_config();
        config.processor.name = String::new();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_empty_file_base_path() {
        let mut config = minimal_config();
        config.processor.processor_type = ProcessorType::File;
        config
            .processor
            .params
            .insert("base_path".into(), "  ".into());
        let err = validate(&config).unwrap_err();
        assert_eq!(field_of(err), "processor.params.base_path");
    }

    #[test]
    fn test_log_processor_ignores_params() {
        let mut config = minimal_config();
        config.processor.params.insert("base_path".into(), "".into());
        assert!(validate(&config).is_ok());
    }
}
