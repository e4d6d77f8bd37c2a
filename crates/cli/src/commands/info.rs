//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::PoolConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo<'a> {
    version: String,
    dispatcher: DispatcherInfo,
    processor: ProcessorInfo<'a>,
}

#[derive(Serialize)]
struct DispatcherInfo {
    capacity: usize,
    validation_policy: String,
    queue_capacity: usize,
}

#[derive(Serialize)]
struct ProcessorInfo<'a> {
    name: &'a str,
    processor_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    params: Vec<(&'a str, &'a str)>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    let pool = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&pool);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&pool);
    }

    Ok(())
}

fn build_config_info(pool: &PoolConfig) -> ConfigInfo<'_> {
    let mut params: Vec<(&str, &str)> = pool
        .processor
        .params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    params.sort_unstable();

    ConfigInfo {
        version: format!("{:?}", pool.version),
        dispatcher: DispatcherInfo {
            capacity: pool.dispatcher.capacity,
            validation_policy: format!("{:?}", pool.dispatcher.validation_policy),
            queue_capacity: pool.dispatcher.queue_capacity,
        },
        processor: ProcessorInfo {
            name: &pool.processor.name,
            processor_type: format!("{:?}", pool.processor.processor_type),
            params,
        },
    }
}

fn print_config_info(pool: &PoolConfig) {
    let info = build_config_info(pool);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 taskpool Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📦 Dispatcher");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Capacity: {}", info.dispatcher.capacity);
    println!("   ├─ Validation policy: {}", info.dispatcher.validation_policy);
    println!("   └─ Queue capacity: {}", info.dispatcher.queue_capacity);

    println!("\n📤 Processor");
    println!("   ├─ Name: {}", info.processor.name);
    if info.processor.params.is_empty() {
        println!("   └─ Type: {}", info.processor.processor_type);
    } else {
        println!("   ├─ Type: {}", info.processor.processor_type);
        println!("   └─ Params ({}):", info.processor.params.len());
        for (i, (key, value)) in info.processor.params.iter().enumerate() {
            let is_last = i == info.processor.params.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!("      {} {} = {}", prefix, key, value);
        }
    }

    println!();
}
