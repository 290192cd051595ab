//! Rotary encoder with LED ring

use super::{Bounds, RingMode, CHANNEL, MAPPING};
use crate::error::Result;
use serde::Serialize;

/// Acceleration setting of an encoder
pub const SPEED: Bounds = Bounds::new(1, 7);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoder {
    ring_mode: RingMode,
    relative_mode: bool,
    speed: u8,
    local_control: bool,
    mapping: u8,
    channel: u8,
    led_mapping: u8,
    led_channel: u8,
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            ring_mode: RingMode::Eq,
            relative_mode: false,
            speed: 5,
            local_control: true,
            mapping: 0,
            channel: 1,
            led_mapping: 0,
            led_channel: 1,
        }
    }
}

impl Encoder {
    pub fn ring_mode(&self) -> RingMode {
        self.ring_mode
    }

    pub fn set_ring_mode(&mut self, ring_mode: RingMode) -> Result<()> {
        self.ring_mode = ring_mode;
        Ok(())
    }

    pub fn relative_mode(&self) -> bool {
        self.relative_mode
    }

    pub fn set_relative_mode(&mut self, relative: bool) -> Result<()> {
        self.relative_mode = relative;
        Ok(())
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: u8) -> Result<()> {
        self.speed = SPEED.check("speed", speed)?;
        Ok(())
    }

    pub fn local_control(&self) -> bool {
        self.local_control
    }

    pub fn set_local_control(&mut self, enabled: bool) -> Result<()> {
        self.local_control = enabled;
        Ok(())
    }

    pub fn mapping(&self) -> u8 {
        self.mapping
    }

    pub fn set_mapping(&mut self, mapping: u8) -> Result<()> {
        self.mapping = MAPPING.check("mapping", mapping)?;
        Ok(())
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn set_channel(&mut self, channel: u8) -> Result<()> {
        self.channel = CHANNEL.check("channel", channel)?;
        Ok(())
    }

    pub fn led_mapping(&self) -> u8 {
        self.led_mapping
    }

    pub fn set_led_mapping(&mut self, mapping: u8) -> Result<()> {
        self.led_mapping = MAPPING.check("ledMapping", mapping)?;
        Ok(())
    }

    pub fn led_channel(&self) -> u8 {
        self.led_channel
    }

    pub fn set_led_channel(&mut self, channel: u8) -> Result<()> {
        self.led_channel = CHANNEL.check("ledChannel", channel)?;
        Ok(())
    }

    /// Copy behaviour fields from `source`; address fields too unless `keep_addressing`
    pub(crate) fn copy_from(&mut self, source: &Encoder, keep_addressing: bool) {
        self.ring_mode = source.ring_mode;
        self.relative_mode = source.relative_mode;
        self.speed = source.speed;
        self.local_control = source.local_control;
        if !keep_addressing {
            self.mapping = source.mapping;
            self.channel = source.channel;
        }
    }
}
