//! NetworkSink - one UDP datagram per batch

use contracts::{ContractError, InputLogEvent, LogDestination, LogSink, PutLogsResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, error, instrument, warn};

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: NetworkFormat,
    /// Max packet size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => NetworkFormat::Bincode,
            Some("json") | None => NetworkFormat::Json,
            Some(other) => return Err(format!("unknown format '{}'", other)),
        };

        let max_packet_size = match params.get("max_packet_size") {
            Some(raw) => raw
                .parse()
                .map_err(|e| format!("invalid max_packet_size '{}': {}", raw, e))?,
            None => 65000,
        };

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Datagram body: one batch addressed to one destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEnvelope {
    pub group_name: String,
    pub stream_name: String,
    pub events: Vec<InputLogEvent>,
}

#[derive(Serialize)]
struct BorrowedEnvelope<'a> {
    group_name: &'a str,
    stream_name: &'a str,
    events: &'a [InputLogEvent],
}

/// Sink that sends batches over UDP
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: Option<UdpSocket>,
}

impl NetworkSink {
    /// Create a new NetworkSink
    #[instrument(name = "network_sink_new", skip(name, config))]
    pub async fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let bind_addr = if config.addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(&config.addr).await?;

        debug!(
            sink = %name,
            target = %config.addr,
            "NetworkSink connected"
        );

        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    /// Create from params (for factory)
    #[instrument(name = "network_sink_from_params", skip(name, params))]
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| ContractError::config_validation("sink.params", e))?;

        Self::new(name.clone(), config)
            .await
            .map_err(|e| ContractError::sink_connection(name, e.to_string()))
    }

    fn encode(&self, destination: &LogDestination, events: &[InputLogEvent]) -> Result<Vec<u8>, String> {
        let envelope = BorrowedEnvelope {
            group_name: &destination.group_name,
            stream_name: &destination.stream_name,
            events,
        };
        match self.config.format {
            NetworkFormat::Json => {
                serde_json::to_vec(&envelope).map_err(|e| format!("json error: {}", e))
            }
            NetworkFormat::Bincode => {
                bincode::serialize(&envelope).map_err(|e| format!("bincode error: {}", e))
            }
        }
    }

    fn socket(&self) -> Result<&UdpSocket, ContractError> {
        self.socket
            .as_ref()
            .ok_or_else(|| ContractError::sink_connection(&self.name, "socket not connected"))
    }

    fn prepare_payload(
        &self,
        destination: &LogDestination,
        events: &[InputLogEvent],
    ) -> Result<Vec<u8>, ContractError> {
        let data = self
            .encode(destination, events)
            .map_err(|e| ContractError::put_logs(&self.name, e))?;

        if data.len() > self.config.max_packet_size {
            warn!(
                sink = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "Packet too large, batch not sent"
            );
            return Err(ContractError::put_logs(
                &self.name,
                format!(
                    "payload of {} bytes exceeds max_packet_size {}",
                    data.len(),
                    self.config.max_packet_size
                ),
            ));
        }

        Ok(data)
    }
}

impl LogSink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_sink_put_logs",
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

        let socket = self.socket()?;
        let data = self.prepare_payload(destination, events)?;

        match socket.send(&data).await {
            Ok(sent) => {
                debug!(sink = %self.name, bytes = sent, "Sent");
                Ok(PutLogsResponse::accepted())
            }
            Err(e) => {
                error!(sink = %self.name, error = %e, "UDP send failed");
                Err(ContractError::put_logs(&self.name, e.to_string()))
            }
        }
    }

    #[instrument(name = "network_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(sink = %self.name, "NetworkSink closed");
        Ok(())
    }
}
