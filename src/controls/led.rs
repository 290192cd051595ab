//! Button lights: RGB for grid/control buttons, monochrome for navigation

use super::{Color, CHANNEL, MAPPING};
use crate::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RgbLed {
    color: Color,
    mapping: u8,
    channel: u8,
}

impl Default for RgbLed {
    fn default() -> Self {
        Self {
            color: Color::Off,
            mapping: 0,
            channel: 1,
        }
    }
}

impl RgbLed {
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) -> Result<()> {
        self.color = color;
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
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonoLed {
    status: bool,
    mapping: u8,
    channel: u8,
}

impl Default for MonoLed {
    fn default() -> Self {
        Self {
            status: false,
            mapping: 0,
            channel: 1,
        }
    }
}

impl MonoLed {
    pub fn status(&self) -> bool {
        self.status
    }

    pub fn set_status(&mut self, on: bool) -> Result<()> {
        self.status = on;
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
}

/// A monochrome light is on for any colour but Off
pub fn color_to_on_off(color: Color) -> bool {
    color != Color::Off
}

/// A lit monochrome light shows as red on an RGB light
pub fn on_off_to_color(on: bool) -> Color {
    if on {
        Color::Red
    } else {
        Color::Off
    }
}

/// State of either kind of button light, used when copying across the two domains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LedState {
    pub color: Color,
    pub mapping: u8,
    pub channel: u8,
}

impl From<&RgbLed> for LedState {
    fn from(led: &RgbLed) -> Self {
        Self {
            color: led.color,
            mapping: led.mapping,
            channel: led.channel,
        }
    }
}

impl From<&MonoLed> for LedState {
    fn from(led: &MonoLed) -> Self {
        Self {
            color: on_off_to_color(led.status),
            mapping: led.mapping,
            channel: led.channel,
        }
    }
}

impl RgbLed {
    pub(crate) fn apply(&mut self, state: LedState, keep_addressing: bool) {
        self.color = state.color;
        if !keep_addressing {
            self.mapping = state.mapping;
            self.channel = state.channel;
        }
    }
}

impl MonoLed {
    pub(crate) fn apply(&mut self, state: LedState, keep_addressing: bool) {
        self.status = color_to_on_off(state.color);
        if !keep_addressing {
            self.mapping = state.mapping;
            self.channel = state.channel;
        }
    }
}
