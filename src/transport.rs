//! MIDI output transport
//!
//! The wire encoder only ever talks to a [`MidiTransport`]. [`MidirTransport`] is
//! the hardware-backed implementation; tests use a recording double.

pub mod discovery;

use midir::{MidiOutput, MidiOutputConnection, MidiOutputPort};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::midi::{format_hex, MidiMessage};

/// Kind of a three-byte channel voice message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMessageKind {
    NoteOn,
    ControlChange,
}

impl ChannelMessageKind {
    fn status_nibble(self) -> u8 {
        match self {
            ChannelMessageKind::NoteOn => 0x90,
            ChannelMessageKind::ControlChange => 0xB0,
        }
    }
}

/// Outbound connection to the device
pub trait MidiTransport {
    fn is_connected(&self) -> bool;

    /// Send a channel voice message; `channel` is the wire value 0-15
    fn send_channel_message(
        &mut self,
        kind: ChannelMessageKind,
        channel: u8,
        data1: u8,
        data2: u8,
    ) -> Result<()>;

    /// Send a complete SysEx message, F0/F7 framing included
    fn send_sysex(&mut self, bytes: &[u8]) -> Result<()>;

    /// Connect to the device by automatic discovery
    fn open(&mut self) -> Result<()>;

    fn send(&mut self, message: &MidiMessage) -> Result<()> {
        match *message {
            MidiMessage::NoteOn { channel, note, velocity } => {
                self.send_channel_message(ChannelMessageKind::NoteOn, channel, note, velocity)
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                self.send_channel_message(ChannelMessageKind::ControlChange, channel, cc, value)
            }
            MidiMessage::SysEx { .. } => self.send_sysex(&message.encode()),
        }
    }
}

/// Output connection through midir
pub struct MidirTransport {
    client_name: String,
    device_patterns: Vec<String>,
    conn: Option<MidiOutputConnection>,
    port_name: Option<String>,
}

impl MidirTransport {
    pub fn new(client_name: impl Into<String>, device_patterns: Vec<String>) -> Self {
        Self {
            client_name: client_name.into(),
            device_patterns,
            conn: None,
            port_name: None,
        }
    }

    /// Name of the connected port, if any
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// Open the output port at `index` in the system's port list
    pub fn open_index(&mut self, index: usize) -> Result<()> {
        self.close();

        let midi_out = self.client()?;
        let ports = midi_out.ports();
        let port = ports
            .get(index)
            .ok_or_else(|| {
                Error::Transport(format!(
                    "output port {} not found ({} available)",
                    index,
                    ports.len()
                ))
            })?
            .clone();
        let name = midi_out
            .port_name(&port)
            .map_err(|e| Error::Transport(format!("failed to read port name: {}", e)))?;

        self.connect(midi_out, &port, name)
    }

    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.close();
            info!(
                "Disconnected from {}",
                self.port_name.take().unwrap_or_default()
            );
        }
    }

    fn client(&self) -> Result<MidiOutput> {
        MidiOutput::new(&self.client_name)
            .map_err(|e| Error::Transport(format!("failed to create MIDI output: {}", e)))
    }

    fn connect(&mut self, midi_out: MidiOutput, port: &MidiOutputPort, name: String) -> Result<()> {
        info!("Connecting to output port: {}", name);
        let conn = midi_out
            .connect(port, &self.client_name)
            .map_err(|e| Error::Transport(format!("failed to connect to '{}': {}", name, e)))?;
        self.conn = Some(conn);
        self.port_name = Some(name);
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| Error::Transport("not connected to output port".into()))?;
        conn.send(bytes)
            .map_err(|e| Error::Transport(format!("failed to send {}: {}", format_hex(bytes), e)))?;
        debug!("Sent: {}", format_hex(bytes));
        Ok(())
    }
}

impl MidiTransport for MidirTransport {
    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn send_channel_message(
        &mut self,
        kind: ChannelMessageKind,
        channel: u8,
        data1: u8,
        data2: u8,
    ) -> Result<()> {
        self.write(&[kind.status_nibble() | (channel & 0x0F), data1 & 0x7F, data2 & 0x7F])
    }

    fn send_sysex(&mut self, bytes: &[u8]) -> Result<()> {
        self.write(bytes)
    }

    fn open(&mut self) -> Result<()> {
        self.close();

        let midi_out = self.client()?;
        debug!("Found {} MIDI output ports", midi_out.port_count());

        let (port, name) = find_output_port(&midi_out, &self.device_patterns).ok_or_else(|| {
            Error::Transport(format!(
                "no output port matching {:?}",
                self.device_patterns
            ))
        })?;

        self.connect(midi_out, &port, name)
    }
}

impl Drop for MidirTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Whether `name` contains any of `patterns`, ignoring case
pub fn matches_device(name: &str, patterns: &[String]) -> bool {
    let name = name.to_lowercase();
    patterns
        .iter()
        .filter(|p| !p.is_empty())
        .any(|p| name.contains(&p.to_lowercase()))
}

/// Find the first output port matching one of the patterns
fn find_output_port(midi_out: &MidiOutput, patterns: &[String]) -> Option<(MidiOutputPort, String)> {
    for port in midi_out.ports() {
        if let Ok(name) = midi_out.port_name(&port) {
            if matches_device(&name, patterns) {
                debug!("Found port '{}' matching {:?}", name, patterns);
                return Some((port, name));
            }
        }
    }
    None
}

/// Transport double that records every message it is asked to send
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    pub connected: bool,
    pub sent: Vec<Vec<u8>>,
    /// Fail the send after this many successful ones
    pub fail_after: Option<usize>,
    pub opened: usize,
}

#[cfg(test)]
impl RecordingTransport {
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    pub fn failing_after(count: usize) -> Self {
        Self {
            connected: true,
            fail_after: Some(count),
            ..Self::default()
        }
    }

    fn record(&mut self, bytes: Vec<u8>) -> Result<()> {
        if self.fail_after == Some(self.sent.len()) {
            return Err(Error::Transport("device unplugged".into()));
        }
        self.sent.push(bytes);
        Ok(())
    }
}

#[cfg(test)]
impl MidiTransport for RecordingTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send_channel_message(
        &mut self,
        kind: ChannelMessageKind,
        channel: u8,
        data1: u8,
        data2: u8,
    ) -> Result<()> {
        self.record(vec![kind.status_nibble() | channel, data1, data2])
    }

    fn send_sysex(&mut self, bytes: &[u8]) -> Result<()> {
        self.record(bytes.to_vec())
    }

    fn open(&mut self) -> Result<()> {
        self.opened += 1;
        self.connected = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_device() {
        let patterns = vec!["Tweaker".to_string()];
        assert!(matches_device("Electrix TWEAKER MIDI 1", &patterns));
        assert!(!matches_device("X-Touch", &patterns));
        assert!(!matches_device("anything", &[String::new()]));
    }

    #[test]
    fn test_send_dispatches_by_message_kind() {
        let mut transport = RecordingTransport::connected();
        transport.send(&MidiMessage::note_on(2, 10, 4)).unwrap();
        transport.send(&MidiMessage::control_change(16, 56, 110)).unwrap();
        transport
            .send(&MidiMessage::SysEx { data: vec![0x00, 0x01] })
            .unwrap();
        assert_eq!(transport.sent, vec![
            vec![0x91, 10, 4],
            vec![0xBF, 56, 110],
            vec![0xF0, 0x00, 0x01, 0xF7],
        ]);
    }

    #[test]
    fn test_unconnected_midir_transport() {
        let mut transport = MidirTransport::new("Tweaker-Config-Test", vec!["Tweaker".into()]);
        assert!(!transport.is_connected());
        assert!(matches!(
            transport.send_sysex(&[0xF0, 0xF7]),
            Err(Error::Transport(_))
        ));
        transport.close();
        assert_eq!(transport.port_name(), None);
    }
}
