//! `run` command implementation.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{ConfigVersion, DispatcherConfig, PoolConfig, ProcessorConfig, ProcessorType};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig, SourceSpec};

/// Capacity used when no configuration file is given
const DEFAULT_CAPACITY: usize = 2;

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let pool = resolve_config(args)?;

    info!(
        processor = %pool.processor.name,
        processor_type = ?pool.processor.processor_type,
        capacity = pool.dispatcher.capacity,
        policy = ?pool.dispatcher.validation_policy,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&pool, &source_spec(args));
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        pool,
        source: source_spec(args),
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    let stats = Pipeline::new(pipeline_config)
        .run(setup_shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    stats.print_summary();

    if stats.is_aborted() {
        return Err(CliError::stream_aborted(
            stats.undelivered.len(),
            stats.outcome.to_string(),
        )
        .into());
    }

    info!(
        outcome = %stats.outcome,
        throughput = format!("{:.2}", stats.throughput()),
        "taskpool finished"
    );
    Ok(())
}

/// Load the configuration file (or defaults) and apply CLI overrides
fn resolve_config(args: &RunArgs) -> Result<PoolConfig> {
    let mut pool = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                return Err(CliError::config_not_found(path).into());
            }
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration file given, using log processor defaults");
            default_config()
        }
    };

    if let Some(capacity) = args.capacity {
        info!(capacity, "Overriding batch capacity from CLI");
        pool.dispatcher.capacity = capacity;
    }
    if let Some(policy) = args.policy {
        info!(policy = ?policy, "Overriding validation policy from CLI");
        pool.dispatcher.validation_policy = policy.into();
    }

    ConfigLoader::validate(&pool).context("Invalid configuration")?;
    Ok(pool)
}

fn default_config() -> PoolConfig {
    PoolConfig {
        version: ConfigVersion::V1,
        dispatcher: DispatcherConfig::with_capacity(DEFAULT_CAPACITY),
        processor: ProcessorConfig {
            name: "console".to_string(),
            processor_type: ProcessorType::Log,
            params: HashMap::new(),
        },
    }
}

fn source_spec(args: &RunArgs) -> SourceSpec {
    match (&args.input, args.generate) {
        (_, Some(count)) => SourceSpec::Generate {
            count,
            interval: Duration::from_millis(args.interval_ms),
        },
        (Some(path), None) if path.as_os_str() != "-" => SourceSpec::File(path.clone()),
        _ => SourceSpec::Stdin,
    }
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(pool: &PoolConfig, source: &SourceSpec) {
    println!("\n=== Configuration Summary ===\n");
    println!("Dispatcher:");
    println!("  Capacity: {}", pool.dispatcher.capacity);
    println!("  Validation policy: {:?}", pool.dispatcher.validation_policy);
    println!("  Queue capacity: {}", pool.dispatcher.queue_capacity);
    println!("\nProcessor:");
    println!(
        "  {} ({:?})",
        pool.processor.name, pool.processor.processor_type
    );
    for (key, value) in &pool.processor.params {
        println!("  {key} = {value}");
    }
    println!("\nSource: {source}");
    println!();
}
