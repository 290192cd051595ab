//! Grid, control and navigation buttons

use super::{OutputType, CHANNEL, MAPPING};
use crate::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    mapping: u8,
    channel: u8,
    output_type: OutputType,
    speed_control: bool,
    local_control: bool,
}

impl Default for Button {
    fn default() -> Self {
        Self {
            mapping: 0,
            channel: 1,
            output_type: OutputType::Note,
            speed_control: false,
            local_control: false,
        }
    }
}

impl Button {
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

    pub fn output_type(&self) -> OutputType {
        self.output_type
    }

    pub fn set_output_type(&mut self, output_type: OutputType) -> Result<()> {
        self.output_type = output_type;
        Ok(())
    }

    pub fn speed_control(&self) -> bool {
        self.speed_control
    }

    pub fn set_speed_control(&mut self, enabled: bool) -> Result<()> {
        self.speed_control = enabled;
        Ok(())
    }

    pub fn local_control(&self) -> bool {
        self.local_control
    }

    pub fn set_local_control(&mut self, enabled: bool) -> Result<()> {
        self.local_control = enabled;
        Ok(())
    }

    pub(crate) fn copy_from(&mut self, source: &Button, keep_addressing: bool) {
        self.output_type = source.output_type;
        self.speed_control = source.speed_control;
        self.local_control = source.local_control;
        if !keep_addressing {
            self.mapping = source.mapping;
            self.channel = source.channel;
        }
    }
}
