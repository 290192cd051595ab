//! Velocity-sensitive drum pads

use super::{Bounds, CHANNEL, MAPPING};
use crate::error::Result;
use serde::Serialize;

pub const THRESHOLD: Bounds = Bounds::new(0, 127);
pub const RESEND_RATE: Bounds = Bounds::new(1, 15);
pub const SENSITIVITY: Bounds = Bounds::new(0, 5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pad {
    hit_mapping: u8,
    hit_channel: u8,
    retrigger_mapping: u8,
    retrigger_channel: u8,
    #[serde(rename = "ccRetrigger17")]
    cc_retrigger_17: bool,
    #[serde(rename = "ccRetrigger8")]
    cc_retrigger_8: bool,
    on_threshold_low: u8,
    on_threshold_high: u8,
    off_threshold_low: u8,
    off_threshold_high: u8,
    resend_rate: u8,
    sensitivity: u8,
}

impl Default for Pad {
    fn default() -> Self {
        Self {
            hit_mapping: 0,
            hit_channel: 1,
            retrigger_mapping: 1,
            retrigger_channel: 1,
            cc_retrigger_17: true,
            cc_retrigger_8: true,
            on_threshold_low: 15,
            on_threshold_high: 0,
            off_threshold_low: 7,
            off_threshold_high: 0,
            resend_rate: 9,
            sensitivity: 5,
        }
    }
}

impl Pad {
    pub fn hit_mapping(&self) -> u8 {
        self.hit_mapping
    }

    pub fn set_hit_mapping(&mut self, mapping: u8) -> Result<()> {
        self.hit_mapping = MAPPING.check("hitMapping", mapping)?;
        Ok(())
    }

    pub fn hit_channel(&self) -> u8 {
        self.hit_channel
    }

    pub fn set_hit_channel(&mut self, channel: u8) -> Result<()> {
        self.hit_channel = CHANNEL.check("hitChannel", channel)?;
        Ok(())
    }

    pub fn retrigger_mapping(&self) -> u8 {
        self.retrigger_mapping
    }

    pub fn set_retrigger_mapping(&mut self, mapping: u8) -> Result<()> {
        self.retrigger_mapping = MAPPING.check("retriggerMapping", mapping)?;
        Ok(())
    }

    pub fn retrigger_channel(&self) -> u8 {
        self.retrigger_channel
    }

    pub fn set_retrigger_channel(&mut self, channel: u8) -> Result<()> {
        self.retrigger_channel = CHANNEL.check("retriggerChannel", channel)?;
        Ok(())
    }

    pub fn cc_retrigger_17(&self) -> bool {
        self.cc_retrigger_17
    }

    pub fn set_cc_retrigger_17(&mut self, enabled: bool) -> Result<()> {
        self.cc_retrigger_17 = enabled;
        Ok(())
    }

    pub fn cc_retrigger_8(&self) -> bool {
        self.cc_retrigger_8
    }

    pub fn set_cc_retrigger_8(&mut self, enabled: bool) -> Result<()> {
        self.cc_retrigger_8 = enabled;
        Ok(())
    }

    pub fn on_threshold_low(&self) -> u8 {
        self.on_threshold_low
    }

    pub fn set_on_threshold_low(&mut self, value: u8) -> Result<()> {
        self.on_threshold_low = THRESHOLD.check("onThresholdLow", value)?;
        Ok(())
    }

    pub fn on_threshold_high(&self) -> u8 {
        self.on_threshold_high
    }

    pub fn set_on_threshold_high(&mut self, value: u8) -> Result<()> {
        self.on_threshold_high = THRESHOLD.check("onThresholdHigh", value)?;
        Ok(())
    }

    pub fn off_threshold_low(&self) -> u8 {
        self.off_threshold_low
    }

    pub fn set_off_threshold_low(&mut self, value: u8) -> Result<()> {
        self.off_threshold_low = THRESHOLD.check("offThresholdLow", value)?;
        Ok(())
    }

    pub fn off_threshold_high(&self) -> u8 {
        self.off_threshold_high
    }

    pub fn set_off_threshold_high(&mut self, value: u8) -> Result<()> {
        self.off_threshold_high = THRESHOLD.check("offThresholdHigh", value)?;
        Ok(())
    }

    pub fn resend_rate(&self) -> u8 {
        self.resend_rate
    }

    pub fn set_resend_rate(&mut self, rate: u8) -> Result<()> {
        self.resend_rate = RESEND_RATE.check("resendRate", rate)?;
        Ok(())
    }

    pub fn sensitivity(&self) -> u8 {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: u8) -> Result<()> {
        self.sensitivity = SENSITIVITY.check("sensitivity", sensitivity)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_ranges() {
        let mut pad = Pad::default();
        assert!(pad.set_resend_rate(0).is_err());
        assert!(pad.set_resend_rate(16).is_err());
        pad.set_resend_rate(15).unwrap();
        assert!(pad.set_sensitivity(6).is_err());
        assert_eq!(pad.sensitivity(), 5);
        assert!(pad.set_on_threshold_high(200).is_err());
        assert_eq!(pad.on_threshold_high(), 0);
    }

    #[test]
    fn test_document_field_names() {
        let value = serde_json::to_value(Pad::default()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "hitMapping",
            "hitChannel",
            "retriggerMapping",
            "retriggerChannel",
            "ccRetrigger17",
            "ccRetrigger8",
            "onThresholdLow",
            "onThresholdHigh",
            "offThresholdLow",
            "offThresholdHigh",
            "resendRate",
            "sensitivity",
        ] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(obj.len(), 12);
    }
}
