//! Control registry
//!
//! Owns one fixed-size collection per control type. The index of an entity is its
//! physical identity (see [`crate::topology`]). Entities are only reachable
//! read-only from outside; every change goes through a validated setter, and every
//! successful change drops the registry out of sync with the hardware.

use crate::addressing::AddressingPolicy;
use crate::controls::{
    Button, Color, Encoder, MonoLed, OutputType, Pad, Potentiometer, RgbLed, RingMode,
};
use crate::error::{Error, Result};
use crate::topology::{
    BUTTON_LED_COUNT, BUTTON_SLOTS, ENCODER_COUNT, NAV_LED_COUNT, PAD_COUNT, POTENTIOMETER_COUNT,
};
use std::fmt;

/// Whether the in-memory configuration matches the last successful dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Synced,
    Unsynced,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::Synced => write!(f, "synced"),
            SyncState::Unsynced => write!(f, "unsynced"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    pub(crate) encoders: [Encoder; ENCODER_COUNT],
    pub(crate) potentiometers: [Potentiometer; POTENTIOMETER_COUNT],
    pub(crate) buttons: [Button; BUTTON_SLOTS],
    pub(crate) pads: [Pad; PAD_COUNT],
    pub(crate) but_leds: [RgbLed; BUTTON_LED_COUNT],
    pub(crate) nav_leds: [MonoLed; NAV_LED_COUNT],
    synced: bool,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry with the factory address layout
    pub fn new() -> Self {
        Self::with_policy(&AddressingPolicy::default())
            .expect("factory addressing assigns mappings within 0-127")
    }

    /// Registry whose default addresses follow `policy`
    ///
    /// Rejects a policy that would push any mapping past 127; every control keeps a
    /// distinct address within its collection.
    pub fn with_policy(policy: &AddressingPolicy) -> Result<Self> {
        policy.validate()?;
        let assign = AddressingPolicy::assign;

        let encoders = addressed(|i, enc: &mut Encoder| {
            enc.set_mapping(assign(policy.encoder_mapping_base, i)?)?;
            enc.set_led_mapping(assign(policy.encoder_led_mapping_base, i)?)
        })?;
        let potentiometers = addressed(|i, pot: &mut Potentiometer| {
            pot.set_mapping(assign(policy.potentiometer_mapping_base, i)?)
        })?;
        let buttons = addressed(|i, button: &mut Button| {
            button.set_mapping(assign(policy.button_mapping_base, i)?)
        })?;
        let pads = addressed(|i, pad: &mut Pad| {
            pad.set_hit_mapping(assign(policy.pad_hit_mapping_base, i)?)?;
            pad.set_retrigger_mapping(assign(policy.pad_retrigger_mapping_base, i)?)
        })?;
        let but_leds = addressed(|i, led: &mut RgbLed| {
            led.set_mapping(assign(policy.button_led_mapping_base, i)?)
        })?;
        let nav_leds = addressed(|i, led: &mut MonoLed| {
            led.set_mapping(assign(policy.nav_led_mapping_base, i)?)
        })?;

        Ok(Self {
            encoders,
            potentiometers,
            buttons,
            pads,
            but_leds,
            nav_leds,
            synced: false,
        })
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn sync_state(&self) -> SyncState {
        if self.synced {
            SyncState::Synced
        } else {
            SyncState::Unsynced
        }
    }

    pub(crate) fn mark_synced(&mut self) {
        self.synced = true;
    }

    pub(crate) fn mark_unsynced(&mut self) {
        self.synced = false;
    }

    /// Replace every collection with the contents of `staged`, leaving the result unsynced
    pub(crate) fn commit(&mut self, staged: Registry) {
        *self = Registry {
            synced: false,
            ..staged
        };
    }

    pub fn encoders(&self) -> &[Encoder] {
        &self.encoders
    }

    pub fn potentiometers(&self) -> &[Potentiometer] {
        &self.potentiometers
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }

    pub fn button_leds(&self) -> &[RgbLed] {
        &self.but_leds
    }

    pub fn nav_leds(&self) -> &[MonoLed] {
        &self.nav_leds
    }

    pub fn encoder(&self, index: usize) -> Result<&Encoder> {
        checked(&self.encoders, "encoders", index)
    }

    pub fn potentiometer(&self, index: usize) -> Result<&Potentiometer> {
        checked(&self.potentiometers, "potentiometers", index)
    }

    pub fn button(&self, index: usize) -> Result<&Button> {
        checked(&self.buttons, "buttons", index)
    }

    pub fn pad(&self, index: usize) -> Result<&Pad> {
        checked(&self.pads, "pads", index)
    }

    pub fn button_led(&self, index: usize) -> Result<&RgbLed> {
        checked(&self.but_leds, "butLeds", index)
    }

    pub fn nav_led(&self, index: usize) -> Result<&MonoLed> {
        checked(&self.nav_leds, "navLeds", index)
    }
}

pub(crate) fn check_index(collection: &'static str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::index(collection, index, len))
    }
}

fn checked<'a, T>(items: &'a [T], collection: &'static str, index: usize) -> Result<&'a T> {
    items
        .get(index)
        .ok_or_else(|| Error::index(collection, index, items.len()))
}

/// Generates `get`/`set` pairs that bounds-check the index, delegate the range
/// check to the entity, and mark the registry unsynced on success.
macro_rules! field_accessors {
    ($collection:ident, $label:literal, $( $get:ident, $set:ident => $inner_get:ident, $inner_set:ident : $ty:ty );* $(;)?) => {
        impl Registry {
            $(
                pub fn $get(&self, index: usize) -> Result<$ty> {
                    Ok(checked(&self.$collection, $label, index)?.$inner_get())
                }

                pub fn $set(&mut self, index: usize, value: $ty) -> Result<()> {
                    let len = self.$collection.len();
                    let entity = self
                        .$collection
                        .get_mut(index)
                        .ok_or_else(|| Error::index($label, index, len))?;
                    entity.$inner_set(value)?;
                    self.synced = false;
                    Ok(())
                }
            )*
        }
    };
}

field_accessors!(encoders, "encoders",
    encoder_ring_mode, set_encoder_ring_mode => ring_mode, set_ring_mode: RingMode;
    encoder_relative_mode, set_encoder_relative_mode => relative_mode, set_relative_mode: bool;
    encoder_speed, set_encoder_speed => speed, set_speed: u8;
    encoder_local_control, set_encoder_local_control => local_control, set_local_control: bool;
    encoder_mapping, set_encoder_mapping => mapping, set_mapping: u8;
    encoder_channel, set_encoder_channel => channel, set_channel: u8;
    encoder_led_mapping, set_encoder_led_mapping => led_mapping, set_led_mapping: u8;
    encoder_led_channel, set_encoder_led_channel => led_channel, set_led_channel: u8;
);

field_accessors!(potentiometers, "potentiometers",
    potentiometer_mapping, set_potentiometer_mapping => mapping, set_mapping: u8;
    potentiometer_channel, set_potentiometer_channel => channel, set_channel: u8;
);

field_accessors!(buttons, "buttons",
    button_mapping, set_button_mapping => mapping, set_mapping: u8;
    button_channel, set_button_channel => channel, set_channel: u8;
    button_output_type, set_button_output_type => output_type, set_output_type: OutputType;
    button_speed_control, set_button_speed_control => speed_control, set_speed_control: bool;
    button_local_control, set_button_local_control => local_control, set_local_control: bool;
);

field_accessors!(pads, "pads",
    pad_hit_mapping, set_pad_hit_mapping => hit_mapping, set_hit_mapping: u8;
    pad_hit_channel, set_pad_hit_channel => hit_channel, set_hit_channel: u8;
    pad_retrigger_mapping, set_pad_retrigger_mapping => retrigger_mapping, set_retrigger_mapping: u8;
    pad_retrigger_channel, set_pad_retrigger_channel => retrigger_channel, set_retrigger_channel: u8;
    pad_cc_retrigger_17, set_pad_cc_retrigger_17 => cc_retrigger_17, set_cc_retrigger_17: bool;
    pad_cc_retrigger_8, set_pad_cc_retrigger_8 => cc_retrigger_8, set_cc_retrigger_8: bool;
    pad_on_threshold_low, set_pad_on_threshold_low => on_threshold_low, set_on_threshold_low: u8;
    pad_on_threshold_high, set_pad_on_threshold_high => on_threshold_high, set_on_threshold_high: u8;
    pad_off_threshold_low, set_pad_off_threshold_low => off_threshold_low, set_off_threshold_low: u8;
    pad_off_threshold_high, set_pad_off_threshold_high => off_threshold_high, set_off_threshold_high: u8;
    pad_resend_rate, set_pad_resend_rate => resend_rate, set_resend_rate: u8;
    pad_sensitivity, set_pad_sensitivity => sensitivity, set_sensitivity: u8;
);

field_accessors!(but_leds, "butLeds",
    button_led_color, set_button_led_color => color, set_color: Color;
    button_led_mapping, set_button_led_mapping => mapping, set_mapping: u8;
    button_led_channel, set_button_led_channel => channel, set_channel: u8;
);

field_accessors!(nav_leds, "navLeds",
    nav_led_status, set_nav_led_status => status, set_status: bool;
    nav_led_mapping, set_nav_led_mapping => mapping, set_mapping: u8;
    nav_led_channel, set_nav_led_channel => channel, set_channel: u8;
);

/// Default entities with `assign_each` applied in index order
fn addressed<T: Default, const N: usize>(
    mut assign_each: impl FnMut(usize, &mut T) -> Result<()>,
) -> Result<[T; N]> {
    let mut items: [T; N] = std::array::from_fn(|_| T::default());
    for (i, item) in items.iter_mut().enumerate() {
        assign_each(i, item)?;
    }
    Ok(items)
}
