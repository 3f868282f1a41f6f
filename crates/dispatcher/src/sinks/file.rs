//! FileSink - appends batches to JSON lines files on disk
//!
//! Layout: `<base_path>/<group_name>/<stream_name>.jsonl`. A group is a
//! directory; its absence is reported as a missing destination unless the sink
//! was configured to create groups on demand.

use contracts::{ContractError, InputLogEvent, LogDestination, LogSink, PutLogsResponse};
use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
    /// Create missing group directories instead of failing
    pub create_groups: bool,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./logs"));

        let create_groups = match params.get("create_groups").map(String::as_str) {
            Some("true") => true,
            Some("false") | None => false,
            Some(other) => return Err(format!("invalid create_groups '{}'", other)),
        };

        Ok(Self {
            base_path,
            create_groups,
        })
    }
}

/// Sink that appends records to per-stream files
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    known_groups: HashSet<PathBuf>,
}

impl FileSink {
    /// Create a new FileSink, creating the base directory if needed
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            known_groups: HashSet::new(),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = FileSinkConfig::from_params(params)
            .map_err(|e| ContractError::config_validation("sink.params", e))?;
        Self::new(name, config).map_err(ContractError::from)
    }

    /// Path of the file a destination is written to
    pub fn stream_path(&self, destination: &LogDestination) -> PathBuf {
        self.config
            .base_path
            .join(&destination.group_name)
            .join(format!("{}.jsonl", destination.stream_name))
    }

    fn check_components(&self, destination: &LogDestination) -> Result<(), ContractError> {
        for part in [&destination.group_name, &destination.stream_name] {
            if !is_plain_component(part) {
                return Err(ContractError::put_logs(
                    &self.name,
                    format!("'{}' is not a valid path component", part),
                ));
            }
        }
        Ok(())
    }
}

/// Make sure the group directory exists, creating it when allowed
fn ensure_group_dir(
    sink_name: &str,
    group_dir: &Path,
    destination: &LogDestination,
    create_groups: bool,
) -> Result<(), ContractError> {
    if group_dir.is_dir() {
        return Ok(());
    }
    if !create_groups {
        return Err(ContractError::destination_not_found(
            destination.to_string(),
            format!("group directory {} does not exist", group_dir.display()),
        ));
    }
    fs::create_dir_all(group_dir)?;
    debug!(sink = %sink_name, group = %destination.group_name, "Group directory created");
    Ok(())
}

fn append(path: &Path, events: &[InputLogEvent]) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for event in events {
        serde_json::to_writer(&mut writer, event)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

fn is_plain_component(part: &str) -> bool {
    !part.is_empty() && part != "." && part != ".." && !part.contains(['/', '\\'])
}

impl LogSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_put_logs",
        skip(self, destination, events),
        fields(sink = %self.name, destination = %destination, events = events.len())
    )]
    async fn put_logs(
        &mut self,
        destination: &LogDestination,
        events: &[InputLogEvent],
    ) -> Result<PutLogsResponse, ContractError> {
        if events.is_empty() {
            return Ok(PutLogsResponse::accepted());
        }

        self.check_components(destination)?;

        // Blocking disk I/O stays on the blocking pool; a put timeout must be
        // able to abandon it.
        let group_dir = self.config.base_path.join(&destination.group_name);
        let check_group = !self.known_groups.contains(&group_dir);
        let create_groups = self.config.create_groups;
        let path = self.stream_path(destination);
        let destination = destination.clone();
        let records = events.to_vec();
        let name = self.name.clone();
        let task_group_dir = group_dir.clone();

        tokio::task::spawn_blocking(move || {
            if check_group {
                ensure_group_dir(&name, &task_group_dir, &destination, create_groups)?;
            }
            append(&path, &records).map_err(|e| {
                error!(sink = %name, path = %path.display(), error = %e, "Write failed");
                ContractError::put_logs(&name, e.to_string())
            })
        })
        .await
        .map_err(|e| ContractError::put_logs(&self.name, format!("write task failed: {e}")))??;

        self.known_groups.insert(group_dir);
        Ok(PutLogsResponse::accepted())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "FileSink closed");
        Ok(())
    }
}
