//! MIDI message types
//!
//! Only the messages the Tweaker configuration protocol uses: Note On for button
//! lights, Control Change for encoder modes and System Exclusive for address blocks.

use std::fmt;

/// Manufacturer/product prefix of every Tweaker SysEx message (after 0xF0)
pub const TWEAKER_SYSEX_HEADER: [u8; 4] = [0x00, 0x01, 0x6A, 0x01];

/// MIDI message types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note On: channel (0-15), note (0-127), velocity (0-127)
    ///
    /// Velocity 0 is kept as Note On; the device reads it as "light off".
    NoteOn { channel: u8, note: u8, velocity: u8 },

    /// Control Change: channel (0-15), cc (0-127), value (0-127)
    ControlChange { channel: u8, cc: u8, value: u8 },

    /// System Exclusive payload, without the F0/F7 framing
    SysEx { data: Vec<u8> },
}

impl MidiMessage {
    /// Note On addressed with a 1-16 channel
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        MidiMessage::NoteOn {
            channel: wire_channel(channel),
            note,
            velocity,
        }
    }

    /// Control Change addressed with a 1-16 channel
    pub fn control_change(channel: u8, cc: u8, value: u8) -> Self {
        MidiMessage::ControlChange {
            channel: wire_channel(channel),
            cc,
            value,
        }
    }

    /// Encode the message to MIDI bytes
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            MidiMessage::NoteOn { channel, note, velocity } => {
                vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                vec![0xB0 | (channel & 0x0F), cc & 0x7F, value & 0x7F]
            }
            MidiMessage::SysEx { ref data } => {
                let mut result = Vec::with_capacity(data.len() + 2);
                result.push(0xF0);
                result.extend_from_slice(data);
                result.push(0xF7);
                result
            }
        }
    }

    /// Get the channel for channel messages (0-15), None for SysEx
    pub fn channel(&self) -> Option<u8> {
        match *self {
            MidiMessage::NoteOn { channel, .. } | MidiMessage::ControlChange { channel, .. } => {
                Some(channel)
            }
            MidiMessage::SysEx { .. } => None,
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::NoteOn { channel, note, velocity } => {
                write!(f, "NoteOn ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                write!(f, "CC ch:{} cc:{} v:{}", channel + 1, cc, value)
            }
            MidiMessage::SysEx { ref data } => {
                write!(f, "SysEx {} bytes", data.len())
            }
        }
    }
}

/// 1-16 channel to the 0-15 value carried in the status byte
fn wire_channel(channel: u8) -> u8 {
    channel.saturating_sub(1) & 0x0F
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
