//! Wire encoder
//!
//! Turns the registry into the message sequence the Tweaker understands and
//! sends it through a [`MidiTransport`].
//!
//! A full dump is, in order:
//! 1. optionally, the four SysEx mapping blocks (buttons, potentiometers, encoders, pads)
//! 2. one CC per encoder carrying its packed ring/speed/mode byte
//! 3. one Note On per button light
//! 4. one Note On per navigation light

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::controls::{Color, Encoder, OutputType, RingMode};
use crate::error::{Error, Result};
use crate::midi::{MidiMessage, TWEAKER_SYSEX_HEADER};
use crate::registry::Registry;
use crate::transport::MidiTransport;

pub const BUTTON_BLOCK: u8 = 1;
pub const POTENTIOMETER_BLOCK: u8 = 2;
pub const ENCODER_BLOCK: u8 = 3;
pub const PAD_BLOCK: u8 = 4;

/// Velocity of a lit navigation light
pub const NAV_LED_ON: u8 = 64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DumpOptions {
    /// Also send the SysEx mapping blocks ahead of the light/mode updates
    #[serde(default)]
    pub include_mapping_blocks: bool,

    /// Channel (1-16) the encoder mode bytes go out on
    #[serde(default = "default_encoder_broadcast_channel")]
    pub encoder_broadcast_channel: u8,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            include_mapping_blocks: false,
            encoder_broadcast_channel: default_encoder_broadcast_channel(),
        }
    }
}

fn default_encoder_broadcast_channel() -> u8 {
    16
}

/// Pack channel and output type: bit 0 set for CC, bits 3-6 = channel - 1
pub fn address_byte(channel: u8, output: OutputType) -> u8 {
    let cc_bit = match output {
        OutputType::Cc => 1,
        OutputType::Note => 0,
    };
    ((channel.saturating_sub(1) & 0x0F) << 3) | cc_bit
}

fn ring_offset(mode: RingMode) -> u8 {
    match mode {
        RingMode::Fill => 0,
        RingMode::Walk => 1,
        RingMode::Eq => 2,
        RingMode::Spread => 3,
    }
}

/// Combined ring mode / speed / relative byte for one encoder
pub fn encoder_mode_byte(encoder: &Encoder) -> u8 {
    let absolute = if encoder.relative_mode() { 0 } else { 4 };
    64 + encoder.speed() * 8 + absolute + ring_offset(encoder.ring_mode())
}

/// Note On velocity that selects `color` on an RGB light
pub fn color_velocity(color: Color) -> u8 {
    match color {
        Color::Off => 0,
        Color::Green => 1,
        Color::Red => 4,
        Color::Yellow => 8,
        Color::Blue => 16,
        Color::Cyan => 32,
        Color::Magenta => 64,
        Color::White => 127,
    }
}

pub fn nav_velocity(on: bool) -> u8 {
    if on {
        NAV_LED_ON
    } else {
        0
    }
}

/// SysEx message for block `id` with one (address, mapping) pair per control
pub fn sysex_block(id: u8, pairs: impl IntoIterator<Item = (u8, u8)>) -> MidiMessage {
    let mut data = TWEAKER_SYSEX_HEADER.to_vec();
    data.push(id);
    for (address, mapping) in pairs {
        data.push(address);
        data.push(mapping & 0x7F);
    }
    MidiMessage::SysEx { data }
}

fn block_messages(registry: &Registry) -> Vec<MidiMessage> {
    let buttons = registry
        .buttons()
        .iter()
        .map(|b| (address_byte(b.channel(), b.output_type()), b.mapping()));

    let pots = registry
        .potentiometers()
        .iter()
        .map(|p| (address_byte(p.channel(), OutputType::Note), p.mapping()));

    let encoders = registry
        .encoders()
        .iter()
        .map(|e| (address_byte(e.channel(), OutputType::Cc), e.mapping()));

    let hits = registry
        .pads()
        .iter()
        .map(|p| (address_byte(p.hit_channel(), OutputType::Note), p.hit_mapping()));
    let retriggers = registry
        .pads()
        .iter()
        .map(|p| (address_byte(p.retrigger_channel(), OutputType::Note), p.retrigger_mapping()));

    vec![
        sysex_block(BUTTON_BLOCK, buttons),
        sysex_block(POTENTIOMETER_BLOCK, pots),
        sysex_block(ENCODER_BLOCK, encoders),
        sysex_block(PAD_BLOCK, hits.chain(retriggers)),
    ]
}

/// The four mapping blocks as framed SysEx bytes, in block id order
pub fn mapping_blocks(registry: &Registry) -> Vec<Vec<u8>> {
    block_messages(registry).iter().map(MidiMessage::encode).collect()
}

/// Every message a dump sends, in order
pub fn dump_plan(registry: &Registry, options: &DumpOptions) -> Vec<MidiMessage> {
    let mut plan = Vec::new();

    if options.include_mapping_blocks {
        plan.extend(block_messages(registry));
    }

    plan.extend(registry.encoders().iter().map(|e| {
        MidiMessage::control_change(
            options.encoder_broadcast_channel,
            e.mapping(),
            encoder_mode_byte(e),
        )
    }));

    plan.extend(
        registry
            .button_leds()
            .iter()
            .map(|led| MidiMessage::note_on(led.channel(), led.mapping(), color_velocity(led.color()))),
    );

    plan.extend(
        registry
            .nav_leds()
            .iter()
            .map(|led| MidiMessage::note_on(led.channel(), led.mapping(), nav_velocity(led.status()))),
    );

    plan
}

/// Send the full configuration to the device
///
/// Stops at the first failed send; messages already sent stay applied on the
/// device and the registry is left unsynced.
pub fn dump<T: MidiTransport + ?Sized>(
    registry: &mut Registry,
    transport: &mut T,
    options: &DumpOptions,
) -> Result<()> {
    if !transport.is_connected() {
        registry.mark_unsynced();
        warn!("Dump skipped: device not connected");
        return Err(Error::Transport("device not connected".into()));
    }

    let plan = dump_plan(registry, options);
    info!("Dumping configuration ({} messages)", plan.len());

    for (sent, message) in plan.iter().enumerate() {
        debug!("Dump {}/{}: {}", sent + 1, plan.len(), message);
        if let Err(e) = transport.send(message) {
            registry.mark_unsynced();
            warn!("Dump aborted after {} of {} messages: {}", sent, plan.len(), e);
            return Err(e);
        }
    }

    registry.mark_synced();
    info!("Dump complete");
    Ok(())
}
