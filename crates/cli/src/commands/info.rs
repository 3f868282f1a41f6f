//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::ShipperBlueprint;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    destination: DestinationInfo,
    export: ExportInfo,
    sink: SinkInfo,
}

#[derive(Serialize)]
struct DestinationInfo {
    group_name: String,
    stream_name: String,
}

#[derive(Serialize)]
struct ExportInfo {
    batch_size: usize,
    interval_ms: u64,
    ordered_logs: bool,
    queue_capacity: usize,
    put_timeout_ms: u64,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    params: BTreeMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&blueprint);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(blueprint: &ShipperBlueprint) -> ConfigInfo {
    let export = &blueprint.export;
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        destination: DestinationInfo {
            group_name: blueprint.destination.group_name.clone(),
            stream_name: blueprint.destination.stream_name.clone(),
        },
        export: ExportInfo {
            batch_size: export.batch_size,
            interval_ms: export.interval_ms,
            ordered_logs: export.ordered_logs,
            queue_capacity: export.queue_capacity,
            put_timeout_ms: export.put_timeout_ms,
        },
        sink: SinkInfo {
            name: blueprint.sink.name.clone(),
            sink_type: format!("{:?}", blueprint.sink.sink_type),
            params: blueprint
                .sink
                .params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        },
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("Configuration ({})", info.version);
    println!(
        "  Destination: {}/{}",
        info.destination.group_name, info.destination.stream_name
    );
    println!("  Sink: {} ({})", info.sink.name, info.sink.sink_type);
    for (key, value) in &info.sink.params {
        println!("    {} = {}", key, value);
    }
    println!(
        "  Export: batch_size={} interval_ms={} ordered={} queue_capacity={} put_timeout_ms={}",
        info.export.batch_size,
        info.export.interval_ms,
        info.export.ordered_logs,
        info.export.queue_capacity,
        info.export.put_timeout_ms
    );
}
