//! Port discovery utilities

use midir::MidiOutput;

use super::matches_device;
use crate::error::{Error, Result};

/// Information about a MIDI output port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub index: usize,
    pub name: String,
    pub is_virtual: bool,
}

impl PortInfo {
    pub fn matches(&self, patterns: &[String]) -> bool {
        matches_device(&self.name, patterns)
    }
}

/// Discover output ports
pub fn list_output_ports(client_name: &str) -> Result<Vec<PortInfo>> {
    let midi_out = MidiOutput::new(client_name)
        .map_err(|e| Error::Transport(format!("failed to create MIDI output: {}", e)))?;

    let mut port_infos = Vec::new();
    for (index, port) in midi_out.ports().iter().enumerate() {
        if let Ok(name) = midi_out.port_name(port) {
            port_infos.push(PortInfo {
                index,
                is_virtual: is_virtual_port(&name),
                name,
            });
        }
    }

    Ok(port_infos)
}

/// Loopback drivers that never lead to hardware
fn is_virtual_port(name: &str) -> bool {
    name.contains("Virtual") || name.contains("loopMIDI") || name.contains("IAC")
}
