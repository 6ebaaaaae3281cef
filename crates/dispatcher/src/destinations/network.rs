//! NetworkDestination - UDP fire-and-forget, one datagram per event

use std::collections::HashMap;
use std::net::{SocketAddr, UdpSocket};

use contracts::{ContractError, Destination, Event, EventTime, OutputChain, Record, RepeatableBatch};
use serde::Serialize;
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

/// Configuration for NetworkDestination
#[derive(Debug, Clone)]
pub struct NetworkDestinationConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: NetworkFormat,
    /// Max datagram size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl NetworkDestinationConfig {
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

        let max_packet_size = params
            .get("max_packet_size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(65000);

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

#[derive(Serialize)]
struct Datagram<'a> {
    tag: &'a str,
    time: EventTime,
    record: &'a Record,
}

/// Destination that sends events over UDP
pub struct NetworkDestination {
    name: String,
    config: NetworkDestinationConfig,
    socket: UdpSocket,
}

impl NetworkDestination {
    /// Create a new NetworkDestination
    #[instrument(name = "network_destination_new", skip(name, config))]
    pub fn new(name: impl Into<String>, config: NetworkDestinationConfig) -> std::io::Result<Self> {
        let name = name.into();
        // Bind to any available port
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(config.addr)?;

        debug!(
            destination = %name,
            target = %config.addr,
            "NetworkDestination connected"
        );

        Ok(Self {
            name,
            config,
            socket,
        })
    }

    /// Create from params (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkDestinationConfig::from_params(params)
            .map_err(|e| ContractError::config_validation(format!("{name}.params"), e))?;

        Self::new(&name, config)
            .map_err(|e| ContractError::destination_connection(&name, e.to_string()))
    }

    fn serialize_event(&self, tag: &str, event: &Event) -> Result<Vec<u8>, String> {
        let datagram = Datagram {
            tag,
            time: event.time,
            record: &event.record,
        };
        match self.config.format {
            NetworkFormat::Json => {
                serde_json::to_vec(&datagram).map_err(|e| format!("json error: {}", e))
            }
            NetworkFormat::Bincode => {
                bincode::serialize(&datagram).map_err(|e| format!("bincode error: {}", e))
            }
        }
    }

    fn prepare_payload(&self, tag: &str, event: &Event) -> Result<Option<Vec<u8>>, ContractError> {
        let data = self
            .serialize_event(tag, event)
            .map_err(|e| ContractError::destination_write(&self.name, e))?;

        if data.len() > self.config.max_packet_size {
            warn!(
                destination = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "Datagram too large, skipping event"
            );
            return Ok(None);
        }

        Ok(Some(data))
    }

    fn transmit(&self, data: &[u8]) {
        match self.socket.send(data) {
            Ok(sent) => {
                debug!(destination = %self.name, bytes = sent, "Sent");
            }
            Err(e) => {
                // Log but don't fail - UDP is best-effort
                error!(destination = %self.name, error = %e, "UDP send failed");
            }
        }
    }
}

impl Destination for NetworkDestination {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_destination_emit",
        skip(self, batch, chain),
        fields(destination = %self.name, events = batch.len())
    )]
    fn emit(
        &self,
        tag: &str,
        batch: &RepeatableBatch,
        chain: &mut dyn OutputChain,
    ) -> Result<(), ContractError> {
        for event in batch.events().iter() {
            if let Some(data) = self.prepare_payload(tag, event)? {
                self.transmit(&data);
            }
        }
        chain.advance()
    }
}
