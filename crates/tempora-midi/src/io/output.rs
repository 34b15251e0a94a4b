//! midir-backed [`MessageSink`].

use crate::error::{Error, Result};
use crate::message::{MessageDevice, MessageSink};
use midir::{MidiOutput, MidiOutputConnection};
use tracing::{debug, info};

/// [`OutputDevice`](crate::OutputDevice) writing to a hardware or virtual port.
pub type MidirDevice = MessageDevice<MidirSink>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiOutputPortInfo {
    pub index: usize,
    pub name: String,
}

/// How a [`MidirSink`] picks its port when connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelector {
    Index(usize),
    /// Case-insensitive substring of the port name
    Name(String),
}

pub fn list_output_ports() -> Vec<MidiOutputPortInfo> {
    let mut ports = Vec::new();
    if let Ok(midi_output) = MidiOutput::new("tempora-port-list") {
        for (index, port) in midi_output.ports().iter().enumerate() {
            let name = midi_output
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown Port {}", index));
            ports.push(MidiOutputPortInfo { index, name });
        }
    }
    ports
}

/// Sink that connects to a midir output port on `connect`.
pub struct MidirSink {
    client_name: String,
    selector: PortSelector,
    connection: Option<MidiOutputConnection>,
    port_name: Option<String>,
}

impl MidirSink {
    pub fn new(selector: PortSelector) -> Self {
        Self {
            client_name: "tempora".to_string(),
            selector,
            connection: None,
            port_name: None,
        }
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// Name of the connected port.
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    pub fn into_device(self) -> MidirDevice {
        MessageDevice::new(self)
    }
}

impl std::fmt::Debug for MidirSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidirSink")
            .field("client_name", &self.client_name)
            .field("selector", &self.selector)
            .field("port_name", &self.port_name)
            .finish()
    }
}

impl MessageSink for MidirSink {
    fn connect(&mut self) -> Result<()> {
        let midi_output = MidiOutput::new(&self.client_name)?;
        let ports = midi_output.ports();

        let port = match &self.selector {
            PortSelector::Index(index) => ports.get(*index).ok_or_else(|| {
                Error::MidiDevice(format!("MIDI output port {} not found", index))
            })?,
            PortSelector::Name(fragment) => {
                let fragment = fragment.to_lowercase();
                ports
                    .iter()
                    .find(|p| {
                        midi_output
                            .port_name(p)
                            .is_ok_and(|name| name.to_lowercase().contains(&fragment))
                    })
                    .ok_or_else(|| {
                        Error::MidiDevice(format!(
                            "No MIDI output port found matching '{}'",
                            fragment
                        ))
                    })?
            }
        };

        let port_name = midi_output
            .port_name(port)
            .unwrap_or_else(|_| "Unknown Port".to_string());
        let connection = midi_output.connect(port, "tempora-output")?;

        info!("Connected MIDI output: {}", port_name);
        self.connection = Some(connection);
        self.port_name = Some(port_name);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            connection.close();
            debug!("Disconnected MIDI output: {:?}", self.port_name.take());
        }
        Ok(())
    }

    fn send_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let connection = self.connection.as_mut().ok_or(Error::DeviceClosed)?;
        connection.send(bytes)?;
        Ok(())
    }
}
