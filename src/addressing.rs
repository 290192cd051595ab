//! Default MIDI address assignment
//!
//! Each collection gets `mapping = base + index` at registry construction. The
//! default bases reproduce the factory layout so dumps stay byte-compatible.

use crate::error::{Error, Result};
use crate::topology::{
    BUTTON_LED_COUNT, BUTTON_SLOTS, ENCODER_COUNT, NAV_LED_COUNT, PAD_COUNT, POTENTIOMETER_COUNT,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AddressingPolicy {
    #[serde(default = "default_button_base")]
    pub button_mapping_base: u8,
    #[serde(default = "default_encoder_base")]
    pub encoder_mapping_base: u8,
    #[serde(default = "default_encoder_led_base")]
    pub encoder_led_mapping_base: u8,
    #[serde(default = "default_potentiometer_base")]
    pub potentiometer_mapping_base: u8,
    #[serde(default = "default_pad_hit_base")]
    pub pad_hit_mapping_base: u8,
    #[serde(default = "default_pad_retrigger_base")]
    pub pad_retrigger_mapping_base: u8,
    #[serde(default = "default_button_led_base")]
    pub button_led_mapping_base: u8,
    #[serde(default = "default_nav_led_base")]
    pub nav_led_mapping_base: u8,
}

impl Default for AddressingPolicy {
    fn default() -> Self {
        Self {
            button_mapping_base: default_button_base(),
            encoder_mapping_base: default_encoder_base(),
            encoder_led_mapping_base: default_encoder_led_base(),
            potentiometer_mapping_base: default_potentiometer_base(),
            pad_hit_mapping_base: default_pad_hit_base(),
            pad_retrigger_mapping_base: default_pad_retrigger_base(),
            button_led_mapping_base: default_button_led_base(),
            nav_led_mapping_base: default_nav_led_base(),
        }
    }
}

impl AddressingPolicy {
    /// Every assigned mapping must fit in 0-127
    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, u8, usize); 8] = [
            ("button_mapping_base", self.button_mapping_base, BUTTON_SLOTS),
            ("encoder_mapping_base", self.encoder_mapping_base, ENCODER_COUNT),
            ("encoder_led_mapping_base", self.encoder_led_mapping_base, ENCODER_COUNT),
            (
                "potentiometer_mapping_base",
                self.potentiometer_mapping_base,
                POTENTIOMETER_COUNT,
            ),
            ("pad_hit_mapping_base", self.pad_hit_mapping_base, PAD_COUNT),
            ("pad_retrigger_mapping_base", self.pad_retrigger_mapping_base, PAD_COUNT),
            ("button_led_mapping_base", self.button_led_mapping_base, BUTTON_LED_COUNT),
            ("nav_led_mapping_base", self.nav_led_mapping_base, NAV_LED_COUNT),
        ];

        for (name, base, len) in checks {
            let last = base as usize + len - 1;
            if last > 127 {
                return Err(Error::Config(format!(
                    "{} {} assigns mapping {} to the last of {} controls (must be <= 127)",
                    name, base, last, len
                )));
            }
        }
        Ok(())
    }

    /// Mapping for the control at `index` of a collection starting at `base`
    pub(crate) fn assign(base: u8, index: usize) -> Result<u8> {
        u8::try_from(base as usize + index).map_err(|_| {
            Error::Config(format!("mapping base {} + index {} does not fit a byte", base, index))
        })
    }
}

fn default_button_base() -> u8 { 1 }
fn default_encoder_base() -> u8 { 56 }
fn default_encoder_led_base() -> u8 { 79 }
fn default_potentiometer_base() -> u8 { 51 }
fn default_pad_hit_base() -> u8 { 63 }
fn default_pad_retrigger_base() -> u8 { 71 }
fn default_button_led_base() -> u8 { 1 }
fn default_nav_led_base() -> u8 { 39 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        AddressingPolicy::default().validate().unwrap();
    }

    #[test]
    fn test_overflowing_base_rejected() {
        let policy = AddressingPolicy {
            button_mapping_base: 100,
            ..AddressingPolicy::default()
        };
        let err = policy.validate().unwrap_err();
        assert!(err.to_string().contains("button_mapping_base"));
    }

    #[test]
    fn test_assign_is_base_plus_index() {
        assert_eq!(AddressingPolicy::assign(56, 6).unwrap(), 62);
        assert_eq!(AddressingPolicy::assign(127, 0).unwrap(), 127);
        assert_eq!(AddressingPolicy::assign(100, 40).unwrap(), 140);
        assert!(AddressingPolicy::assign(250, 10).is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let policy: AddressingPolicy = serde_yaml::from_str("encoder_mapping_base: 20\n").unwrap();
        assert_eq!(policy.encoder_mapping_base, 20);
        assert_eq!(policy.pad_hit_mapping_base, 63);
    }
}
