//! Config validation
//!
//! Rules:
//! - group / stream names non-empty and at most 512 characters
//! - stream name contains neither ':' nor '*'
//! - 1 <= batch_size <= 10000
//! - interval, queue capacity and put timeout > 0
//! - sink name non-empty, network sink has an `addr`

use contracts::{ContractError, ShipperBlueprint, SinkType};

/// Longest accepted group or stream name
pub const MAX_NAME_LEN: usize = 512;
/// Largest batch a single put logs call may carry
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Validate a ShipperBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &ShipperBlueprint) -> Result<(), ContractError> {
    validate_destination(blueprint)?;
    validate_export(blueprint)?;
    validate_sink(blueprint)?;
    Ok(())
}

fn validate_name(field: &str, value: &str) -> Result<(), ContractError> {
    if value.is_empty() {
        return Err(ContractError::config_validation(field, "name cannot be empty"));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ContractError::config_validation(
            field,
            format!("name must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

fn validate_destination(blueprint: &ShipperBlueprint) -> Result<(), ContractError> {
    let destination = &blueprint.destination;
    validate_name("destination.group_name", &destination.group_name)?;
    validate_name("destination.stream_name", &destination.stream_name)?;

    if destination.stream_name.contains([':', '*']) {
        return Err(ContractError::config_validation(
            "destination.stream_name",
            format!(
                "stream name '{}' must not contain ':' or '*'",
                destination.stream_name
            ),
        ));
    }
    Ok(())
}

fn validate_export(blueprint: &ShipperBlueprint) -> Result<(), ContractError> {
    let export = &blueprint.export;

    if export.batch_size == 0 || export.batch_size > MAX_BATCH_SIZE {
        return Err(ContractError::config_validation(
            "export.batch_size",
            format!(
                "batch_size must be in 1..={MAX_BATCH_SIZE}, got {}",
                export.batch_size
            ),
        ));
    }
    if export.interval_ms == 0 {
        return Err(ContractError::config_validation(
            "export.interval_ms",
            "interval_ms must be > 0",
        ));
    }
    if export.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "export.queue_capacity",
            "queue_capacity must be > 0",
        ));
    }
    if export.put_timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "export.put_timeout_ms",
            "put_timeout_ms must be > 0",
        ));
    }
    Ok(())
}

fn validate_sink(blueprint: &ShipperBlueprint) -> Result<(), ContractError> {
    let sink = &blueprint.sink;
    if sink.name.is_empty() {
        return Err(ContractError::config_validation(
            "sink.name",
            "sink name cannot be empty",
        ));
    }
    if sink.sink_type == SinkType::Network && !sink.params.contains_key("addr") {
        return Err(ContractError::config_validation(
            "sink.params.addr",
            "network sink requires an 'addr' parameter",
        ));
    }
    Ok(())
}
