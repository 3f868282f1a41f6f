//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{ShipperBlueprint, SinkType};
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
    destination: String,
    sink: String,
    batch_size: usize,
    interval_ms: u64,
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
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
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
                    version: format!("{:?}", blueprint.version),
                    destination: blueprint.log_destination().to_string(),
                    sink: format!("{} ({:?})", blueprint.sink.name, blueprint.sink.sink_type),
                    batch_size: blueprint.export.batch_size,
                    interval_ms: blueprint.export.interval_ms,
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
fn collect_warnings(blueprint: &ShipperBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let export = &blueprint.export;

    if export.batch_size == 1 {
        warnings.push("export.batch_size is 1 - every event is its own sink call".to_string());
    }

    if export.put_timeout_ms > export.interval_ms {
        warnings.push(format!(
            "export.put_timeout_ms ({}) exceeds export.interval_ms ({}) - a slow sink delays timed flushes",
            export.put_timeout_ms, export.interval_ms
        ));
    }

    if export.queue_capacity < export.batch_size {
        warnings.push(format!(
            "export.queue_capacity ({}) is below export.batch_size ({})",
            export.queue_capacity, export.batch_size
        ));
    }

    if blueprint.sink.sink_type == SinkType::File
        && !blueprint.sink.params.contains_key("base_path")
    {
        warnings.push("file sink has no base_path - defaulting to ./logs".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Destination: {}", summary.destination);
            println!("  Sink: {}", summary.sink);
            println!("  Batch size: {}", summary.batch_size);
            println!("  Interval: {} ms", summary.interval_ms);
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
