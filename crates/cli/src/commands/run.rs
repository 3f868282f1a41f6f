//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::ShipperBlueprint;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::shipper::{Shipper, ShipperConfig};

/// Execute the `run` command
pub async fn run_shipper(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut blueprint, args)?;

    info!(
        destination = %blueprint.log_destination(),
        sink = %blueprint.sink.name,
        sink_type = ?blueprint.sink.sink_type,
        batch_size = blueprint.export.batch_size,
        interval_ms = blueprint.export.interval_ms,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let shipper = Shipper::new(ShipperConfig {
        blueprint,
        input: args.input.clone(),
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    });

    let stats = shipper.run().await.context("Shipper execution failed")?;

    info!(
        lines_read = stats.lines_read,
        delivered = stats.metrics.delivered_count,
        lost = stats.metrics.lost_count,
        duration_secs = stats.duration.as_secs_f64(),
        interrupted = stats.interrupted,
        "Shipper finished"
    );
    stats.print_summary();

    Ok(())
}

/// Apply command-line overrides and re-validate
fn apply_overrides(blueprint: &mut ShipperBlueprint, args: &RunArgs) -> Result<(), CliError> {
    if let Some(ref group) = args.group {
        info!(group = %group, "Overriding group name from CLI");
        blueprint.destination.group_name = group.clone();
    }
    if let Some(ref stream) = args.stream {
        info!(stream = %stream, "Overriding stream name from CLI");
        blueprint.destination.stream_name = stream.clone();
    }
    if let Some(batch_size) = args.batch_size {
        blueprint.export.batch_size = batch_size;
    }
    if let Some(interval_ms) = args.interval_ms {
        blueprint.export.interval_ms = interval_ms;
    }
    if args.ordered {
        blueprint.export.ordered_logs = true;
    }

    config_loader::ConfigLoader::validate(blueprint)
        .map_err(|e| CliError::invalid_override(e.to_string()))
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &ShipperBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Destination: {}", blueprint.log_destination());
    println!(
        "Sink: {} ({:?})",
        blueprint.sink.name, blueprint.sink.sink_type
    );
    for (key, value) in &blueprint.sink.params {
        println!("  {} = {}", key, value);
    }

    let export = &blueprint.export;
    println!("\nExport Settings:");
    println!("  Batch size: {}", export.batch_size);
    println!("  Interval: {} ms", export.interval_ms);
    println!("  Ordered logs: {}", export.ordered_logs);
    println!("  Queue capacity: {}", export.queue_capacity);
    println!("  Put timeout: {} ms", export.put_timeout_ms);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use contracts::{ConfigVersion, DestinationConfig, ExportSettings, SinkConfig, SinkType};
    use std::collections::HashMap;

    fn blueprint() -> ShipperBlueprint {
        ShipperBlueprint {
            version: ConfigVersion::V1,
            destination: DestinationConfig {
                group_name: "app".into(),
                stream_name: "web".into(),
            },
            export: ExportSettings::default(),
            sink: SinkConfig {
                name: "console".into(),
                sink_type: SinkType::Log,
                params: HashMap::new(),
            },
        }
    }

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["run"];
        argv.extend_from_slice(extra);
        RunArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_overrides_applied() {
        let mut blueprint = blueprint();
        let args = run_args(&["--stream", "worker", "--interval-ms", "250", "--ordered"]);

        apply_overrides(&mut blueprint, &args).unwrap();
        assert_eq!(blueprint.destination.stream_name, "worker");
        assert_eq!(blueprint.export.interval_ms, 250);
        assert!(blueprint.export.ordered_logs);
        assert_eq!(blueprint.destination.group_name, "app");
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut blueprint = blueprint();
        let args = run_args(&["--batch-size", "0"]);

        let err = apply_overrides(&mut blueprint, &args).unwrap_err();
        assert!(matches!(err, CliError::InvalidOverride { .. }));
    }
}
