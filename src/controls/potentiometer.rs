//! Knobs, faders and the crossfader

use super::{CHANNEL, MAPPING};
use crate::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Potentiometer {
    mapping: u8,
    channel: u8,
}

impl Default for Potentiometer {
    fn default() -> Self {
        Self {
            mapping: 0,
            channel: 1,
        }
    }
}

impl Potentiometer {
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
