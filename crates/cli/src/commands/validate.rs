//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{PoolConfig, ProcessorType, ValidationPolicy};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    capacity: usize,
    validation_policy: ValidationPolicy,
    queue_capacity: usize,
    processor: String,
    processor_type: ProcessorType,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(pool) => {
            let warnings = collect_warnings(&pool);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", pool.version),
                    capacity: pool.dispatcher.capacity,
                    validation_policy: pool.dispatcher.validation_policy,
                    queue_capacity: pool.dispatcher.queue_capacity,
                    processor: pool.processor.name.clone(),
                    processor_type: pool.processor.processor_type,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(pool: &PoolConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if pool.dispatcher.capacity == 1 {
        warnings.push("capacity is 1 - every task is processed as its own batch".to_string());
    }

    if pool.dispatcher.queue_capacity < pool.dispatcher.capacity {
        warnings.push(format!(
            "queue_capacity ({}) is smaller than capacity ({})",
            pool.dispatcher.queue_capacity, pool.dispatcher.capacity
        ));
    }

    let processor = &pool.processor;
    match processor.processor_type {
        ProcessorType::File if !processor.params.contains_key("base_path") => {
            warnings.push("file processor has no base_path - writing to ./batches".to_string());
        }
        ProcessorType::Log if !processor.params.is_empty() => {
            warnings.push(format!(
                "log processor '{}' ignores its params",
                processor.name
            ));
        }
        _ => {}
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Capacity: {}", summary.capacity);
            println!("  Validation policy: {:?}", summary.validation_policy);
            println!("  Queue capacity: {}", summary.queue_capacity);
            println!(
                "  Processor: {} ({:?})",
                summary.processor, summary.processor_type
            );
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
