//! Propagation engine
//!
//! Copies one control's configuration onto a group of physically related controls.
//! With `keep_addressing` the targets keep their own mapping and channel; without it
//! every target ends up on the source's MIDI address.
//!
//! Button lights travel with their buttons. Grid and control buttons carry RGB
//! lights, navigation buttons carry monochrome ones, and a copy between the two
//! goes through [`color_to_on_off`](crate::controls::color_to_on_off) /
//! [`on_off_to_color`](crate::controls::on_off_to_color).

use crate::controls::led::LedState;
use crate::error::{Error, Result};
use crate::registry::{check_index, Registry};
use crate::topology::{
    grid_column, grid_row, is_navigation, led_for_button, LedSlot, ACTIVE_BUTTONS,
    CONTROL_BUTTONS, ENCODER_COUNT, GRID, GRID_COLUMNS, LEFT_CONTROL, NAV_ROW, PAD_COUNT,
    POTENTIOMETER_COUNT, RIGHT_CONTROL, RING_ENCODERS,
};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonScope {
    All,
    Grid,
    Control,
    Column,
    Row,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderScope {
    All,
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PotentiometerScope {
    All,
    Faders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadScope {
    All,
    Row,
    Column,
}

macro_rules! scope_names {
    ($scope:ident { $( $variant:ident => $name:literal ),* $(,)? }) => {
        impl fmt::Display for $scope {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( $scope::$variant => f.write_str($name), )*
                }
            }
        }

        impl FromStr for $scope {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s.to_ascii_lowercase().as_str() {
                    $( $name => Ok($scope::$variant), )*
                    _ => Err(Error::InvalidValue {
                        field: stringify!($scope),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

scope_names!(ButtonScope { All => "all", Grid => "grid", Control => "control", Column => "column", Row => "row" });
scope_names!(EncoderScope { All => "all", Row => "row", Column => "column" });
scope_names!(PotentiometerScope { All => "all", Faders => "faders" });
scope_names!(PadScope { All => "all", Row => "row", Column => "column" });

// ---------------------------------------------------------------------------
// Buttons
// ---------------------------------------------------------------------------

pub fn propagate_buttons(
    registry: &mut Registry,
    scope: ButtonScope,
    source: usize,
    keep_addressing: bool,
) -> Result<()> {
    match scope {
        ButtonScope::All => button_all(registry, source, keep_addressing),
        ButtonScope::Grid => button_grid(registry, source, keep_addressing),
        ButtonScope::Control => button_control(registry, source, keep_addressing),
        ButtonScope::Column => button_column(registry, source, keep_addressing),
        ButtonScope::Row => button_row(registry, source, keep_addressing),
    }
}

/// Every active button
pub fn button_all(registry: &mut Registry, source: usize, keep_addressing: bool) -> Result<()> {
    check_index("buttons", source, ACTIVE_BUTTONS)?;
    debug!("Button propagate all: source {}, keep addressing {}", source, keep_addressing);
    copy_buttons(registry, source, 0..ACTIVE_BUTTONS, keep_addressing);
    Ok(())
}

/// The 8x4 grid
pub fn button_grid(registry: &mut Registry, source: usize, keep_addressing: bool) -> Result<()> {
    check_index("buttons", source, ACTIVE_BUTTONS)?;
    debug!("Button propagate grid: source {}, keep addressing {}", source, keep_addressing);
    copy_buttons(registry, source, GRID, keep_addressing);
    Ok(())
}

/// Both control button triples
pub fn button_control(registry: &mut Registry, source: usize, keep_addressing: bool) -> Result<()> {
    check_index("buttons", source, ACTIVE_BUTTONS)?;
    debug!("Button propagate control: source {}, keep addressing {}", source, keep_addressing);
    copy_buttons(registry, source, CONTROL_BUTTONS, keep_addressing);
    Ok(())
}

/// Same grid column, or the source's control triple. Navigation has a single
/// column, so nothing changes there.
pub fn button_column(registry: &mut Registry, source: usize, keep_addressing: bool) -> Result<()> {
    check_index("buttons", source, ACTIVE_BUTTONS)?;
    debug!("Button propagate column: source {}, keep addressing {}", source, keep_addressing);

    let targets: Vec<usize> = if GRID.contains(&source) {
        (grid_column(source)..GRID.end).step_by(GRID_COLUMNS).collect()
    } else if LEFT_CONTROL.contains(&source) {
        LEFT_CONTROL.collect()
    } else if RIGHT_CONTROL.contains(&source) {
        RIGHT_CONTROL.collect()
    } else {
        Vec::new()
    };

    copy_buttons(registry, source, targets, keep_addressing);
    Ok(())
}

/// Same grid row, the mirrored control button, or the navigation row
pub fn button_row(registry: &mut Registry, source: usize, keep_addressing: bool) -> Result<()> {
    check_index("buttons", source, ACTIVE_BUTTONS)?;
    debug!("Button propagate row: source {}, keep addressing {}", source, keep_addressing);

    let targets: Vec<usize> = if GRID.contains(&source) {
        let start = grid_row(source) * GRID_COLUMNS;
        (start..start + GRID_COLUMNS).collect()
    } else if CONTROL_BUTTONS.contains(&source) {
        if source < RIGHT_CONTROL.start {
            vec![source + LEFT_CONTROL.len()]
        } else {
            vec![source - LEFT_CONTROL.len()]
        }
    } else if is_navigation(source) && NAV_ROW.contains(&source) {
        NAV_ROW.to_vec()
    } else {
        Vec::new()
    };

    copy_buttons(registry, source, targets, keep_addressing);
    Ok(())
}

fn copy_buttons(
    registry: &mut Registry,
    source: usize,
    targets: impl IntoIterator<Item = usize>,
    keep_addressing: bool,
) {
    let source_button = registry.buttons[source].clone();
    let source_led = led_state(registry, source);
    let mut changed = false;

    for target in targets {
        let button = &mut registry.buttons[target];
        let before = button.clone();
        button.copy_from(&source_button, keep_addressing);
        changed |= *button != before;

        if let Some(state) = source_led {
            changed |= apply_led(registry, target, state, keep_addressing);
        }
    }

    if changed {
        registry.mark_unsynced();
    }
}

fn led_state(registry: &Registry, button: usize) -> Option<LedState> {
    match led_for_button(button)? {
        LedSlot::Rgb(i) => Some(LedState::from(&registry.but_leds[i])),
        LedSlot::Nav(i) => Some(LedState::from(&registry.nav_leds[i])),
    }
}

/// Returns whether the target light changed
fn apply_led(registry: &mut Registry, button: usize, state: LedState, keep_addressing: bool) -> bool {
    match led_for_button(button) {
        Some(LedSlot::Rgb(i)) => {
            let led = &mut registry.but_leds[i];
            let before = led.clone();
            led.apply(state, keep_addressing);
            *led != before
        }
        Some(LedSlot::Nav(i)) => {
            let led = &mut registry.nav_leds[i];
            let before = led.clone();
            led.apply(state, keep_addressing);
            *led != before
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Encoders
// ---------------------------------------------------------------------------

pub fn propagate_encoders(
    registry: &mut Registry,
    scope: EncoderScope,
    source: usize,
    keep_addressing: bool,
) -> Result<()> {
    match scope {
        EncoderScope::All => encoder_all(registry, source, keep_addressing),
        EncoderScope::Row => encoder_row(registry, source, keep_addressing),
        EncoderScope::Column => encoder_column(registry, source, keep_addressing),
    }
}

/// Every encoder, the big one included
pub fn encoder_all(registry: &mut Registry, source: usize, keep_addressing: bool) -> Result<()> {
    check_index("encoders", source, ENCODER_COUNT)?;
    debug!("Encoder propagate all: source {}, keep addressing {}", source, keep_addressing);
    copy_encoders(registry, source, 0..ENCODER_COUNT, keep_addressing);
    Ok(())
}

/// The ring encoder on the same row of the other column
pub fn encoder_row(registry: &mut Registry, source: usize, keep_addressing: bool) -> Result<()> {
    check_ring_encoder(source)?;
    debug!("Encoder propagate row: source {}, keep addressing {}", source, keep_addressing);
    let half = RING_ENCODERS.len() / 2;
    let target = if source > half { source - half } else { source + half };
    copy_encoders(registry, source, [target], keep_addressing);
    Ok(())
}

/// The three ring encoders of the source's column
pub fn encoder_column(registry: &mut Registry, source: usize, keep_addressing: bool) -> Result<()> {
    check_ring_encoder(source)?;
    debug!("Encoder propagate column: source {}, keep addressing {}", source, keep_addressing);
    let half = RING_ENCODERS.len() / 2;
    let left = RING_ENCODERS.start..RING_ENCODERS.start + half;
    let targets = if left.contains(&source) {
        left
    } else {
        left.end..RING_ENCODERS.end
    };
    copy_encoders(registry, source, targets, keep_addressing);
    Ok(())
}

fn check_ring_encoder(source: usize) -> Result<()> {
    if RING_ENCODERS.contains(&source) {
        Ok(())
    } else {
        Err(Error::index("ring encoders", source, RING_ENCODERS.end))
    }
}

fn copy_encoders(
    registry: &mut Registry,
    source: usize,
    targets: impl IntoIterator<Item = usize>,
    keep_addressing: bool,
) {
    let source_encoder = registry.encoders[source].clone();
    let mut changed = false;

    for target in targets {
        let encoder = &mut registry.encoders[target];
        let before = encoder.clone();
        encoder.copy_from(&source_encoder, keep_addressing);
        changed |= *encoder != before;
    }

    if changed {
        registry.mark_unsynced();
    }
}

// ---------------------------------------------------------------------------
// Potentiometers and pads
//
// No physical grouping is defined for these yet; the operations validate their
// source and leave the registry as it is.
// ---------------------------------------------------------------------------

pub fn propagate_potentiometers(
    _registry: &mut Registry,
    scope: PotentiometerScope,
    source: usize,
    keep_addressing: bool,
) -> Result<()> {
    check_index("potentiometers", source, POTENTIOMETER_COUNT)?;
    debug!(
        "Potentiometer propagate {}: source {}, keep addressing {} (no layout defined)",
        scope, source, keep_addressing
    );
    Ok(())
}

pub fn propagate_pads(
    _registry: &mut Registry,
    scope: PadScope,
    source: usize,
    keep_addressing: bool,
) -> Result<()> {
    check_index("pads", source, PAD_COUNT)?;
    debug!(
        "Pad propagate {}: source {}, keep addressing {} (no layout defined)",
        scope, source, keep_addressing
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{Color, OutputType, RingMode};
    use crate::topology::{BUTTON_SLOTS, NAVIGATION};

    fn styled_button(reg: &mut Registry, index: usize) {
        reg.set_button_output_type(index, OutputType::Cc).unwrap();
        reg.set_button_speed_control(index, true).unwrap();
        reg.set_button_local_control(index, true).unwrap();
        reg.set_button_mapping(index, 99).unwrap();
        reg.set_button_channel(index, 5).unwrap();
    }

    fn styled_encoder(reg: &mut Registry, index: usize) {
        reg.set_encoder_ring_mode(index, RingMode::Spread).unwrap();
        reg.set_encoder_relative_mode(index, true).unwrap();
        reg.set_encoder_speed(index, 2).unwrap();
        reg.set_encoder_local_control(index, false).unwrap();
        reg.set_encoder_mapping(index, 100).unwrap();
        reg.set_encoder_channel(index, 3).unwrap();
    }

    #[test]
    fn test_grid_end_to_end() {
        let mut reg = Registry::new();
        let before = reg.clone();
        reg.set_button_mapping(0, 99).unwrap();

        button_grid(&mut reg, 0, false).unwrap();

        for i in GRID {
            assert_eq!(reg.button_mapping(i).unwrap(), 99, "button {}", i);
        }
        for i in 32..ACTIVE_BUTTONS {
            assert_eq!(reg.buttons()[i], before.buttons()[i], "button {}", i);
        }
    }

    #[test]
    fn test_keep_addressing_preserves_targets() {
        let mut reg = Registry::new();
        styled_button(&mut reg, 9);
        reg.set_button_led_color(9, Color::Green).unwrap();

        button_grid(&mut reg, 9, true).unwrap();

        for i in GRID {
            assert_eq!(reg.button_output_type(i).unwrap(), OutputType::Cc);
            assert!(reg.button_speed_control(i).unwrap());
            assert_eq!(reg.button_led_color(i).unwrap(), Color::Green);
            if i != 9 {
                assert_eq!(reg.button_mapping(i).unwrap(), i as u8 + 1);
                assert_eq!(reg.button_channel(i).unwrap(), 1);
                assert_eq!(reg.button_led_mapping(i).unwrap(), i as u8 + 1);
            }
        }
    }

    #[test]
    fn test_all_from_rgb_source_reaches_navigation() {
        let mut reg = Registry::new();
        styled_button(&mut reg, 3);
        reg.set_button_led_color(3, Color::Yellow).unwrap();
        reg.set_button_led_mapping(3, 77).unwrap();

        button_all(&mut reg, 3, false).unwrap();

        for i in 0..ACTIVE_BUTTONS {
            assert_eq!(reg.button_mapping(i).unwrap(), 99);
            assert_eq!(reg.button_channel(i).unwrap(), 5);
        }
        for i in 0..38 {
            assert_eq!(reg.button_led_color(i).unwrap(), Color::Yellow);
            assert_eq!(reg.button_led_mapping(i).unwrap(), 77);
        }
        for i in 0..5 {
            assert!(reg.nav_led_status(i).unwrap());
            assert_eq!(reg.nav_led_mapping(i).unwrap(), 77);
        }
        // Unused slots stay put
        for i in ACTIVE_BUTTONS..BUTTON_SLOTS {
            assert_eq!(reg.button_mapping(i).unwrap(), i as u8 + 1);
        }
    }

    #[test]
    fn test_all_from_navigation_source() {
        let mut reg = Registry::new();
        reg.set_button_led_color(0, Color::Blue).unwrap();
        reg.set_nav_led_status(2, true).unwrap();

        button_all(&mut reg, 40, true).unwrap();

        for i in 0..38 {
            assert_eq!(reg.button_led_color(i).unwrap(), Color::Red);
        }
        for i in 0..5 {
            assert!(reg.nav_led_status(i).unwrap());
            assert_eq!(reg.nav_led_mapping(i).unwrap(), 39 + i as u8);
        }

        reg.set_nav_led_status(2, false).unwrap();
        button_all(&mut reg, 40, true).unwrap();
        assert_eq!(reg.button_led_color(12).unwrap(), Color::Off);
        assert!(!reg.nav_led_status(0).unwrap());
    }

    #[test]
    fn test_control_from_navigation_source() {
        let mut reg = Registry::new();
        reg.set_nav_led_status(0, true).unwrap();
        button_control(&mut reg, 38, true).unwrap();
        for i in CONTROL_BUTTONS {
            assert_eq!(reg.button_led_color(i).unwrap(), Color::Red);
        }
        assert_eq!(reg.button_led_color(31).unwrap(), Color::Off);
    }

    #[test]
    fn test_column_targets() {
        let mut reg = Registry::new();
        styled_button(&mut reg, 18);
        button_column(&mut reg, 18, false).unwrap();
        for i in 0..ACTIVE_BUTTONS {
            let expected = [2, 10, 18, 26].contains(&i);
            assert_eq!(reg.button_mapping(i).unwrap() == 99, expected, "button {}", i);
        }

        let mut reg = Registry::new();
        styled_button(&mut reg, 36);
        button_column(&mut reg, 36, false).unwrap();
        for i in 0..ACTIVE_BUTTONS {
            let expected = (35..38).contains(&i);
            assert_eq!(reg.button_mapping(i).unwrap() == 99, expected, "button {}", i);
        }
    }

    #[test]
    fn test_navigation_column_is_noop() {
        let mut reg = Registry::new();
        styled_button(&mut reg, 38);
        reg.set_nav_led_status(0, true).unwrap();
        reg.mark_synced();
        let before = reg.clone();

        for source in NAVIGATION {
            button_column(&mut reg, source, false).unwrap();
        }
        assert_eq!(reg, before);
        assert!(reg.is_synced());
    }

    #[test]
    fn test_row_targets() {
        let mut reg = Registry::new();
        styled_button(&mut reg, 21);
        button_row(&mut reg, 21, false).unwrap();
        for i in 0..ACTIVE_BUTTONS {
            let expected = (16..24).contains(&i);
            assert_eq!(reg.button_mapping(i).unwrap() == 99, expected, "button {}", i);
        }

        // Control buttons mirror across the two triples
        let mut reg = Registry::new();
        styled_button(&mut reg, 33);
        button_row(&mut reg, 33, false).unwrap();
        assert_eq!(reg.button_mapping(36).unwrap(), 99);
        assert_eq!(reg.button_mapping(35).unwrap(), 36);

        let mut reg = Registry::new();
        styled_button(&mut reg, 37);
        button_row(&mut reg, 37, false).unwrap();
        assert_eq!(reg.button_mapping(34).unwrap(), 99);
    }

    #[test]
    fn test_navigation_row() {
        let mut reg = Registry::new();
        styled_button(&mut reg, 41);
        reg.set_nav_led_status(3, true).unwrap();
        button_row(&mut reg, 41, false).unwrap();
        for i in NAV_ROW {
            assert_eq!(reg.button_mapping(i).unwrap(), 99);
            assert!(reg.nav_led_status(i - 38).unwrap());
        }
        assert_eq!(reg.button_mapping(38).unwrap(), 39);
        assert!(!reg.nav_led_status(0).unwrap());

        // Up and center are not part of any row
        let mut reg = Registry::new();
        styled_button(&mut reg, 40);
        let before = reg.clone();
        button_row(&mut reg, 40, false).unwrap();
        assert_eq!(reg, before);
    }

    #[test]
    fn test_source_is_fixed_point() {
        for source in 0..ACTIVE_BUTTONS {
            for scope in [
                ButtonScope::All,
                ButtonScope::Grid,
                ButtonScope::Control,
                ButtonScope::Column,
                ButtonScope::Row,
            ] {
                let mut reg = Registry::new();
                styled_button(&mut reg, source);
                let before = reg.clone();
                propagate_buttons(&mut reg, scope, source, false).unwrap();
                assert_eq!(reg.buttons()[source], before.buttons()[source]);
                assert_eq!(led_state(&reg, source), led_state(&before, source));
            }
        }
    }

    #[test]
    fn test_button_source_bounds() {
        let mut reg = Registry::new();
        let before = reg.clone();
        assert!(matches!(
            button_all(&mut reg, ACTIVE_BUTTONS, false),
            Err(Error::Index { .. })
        ));
        assert!(button_row(&mut reg, 100, false).is_err());
        assert_eq!(reg, before);
    }

    #[test]
    fn test_encoder_all_idempotent() {
        for source in 0..ENCODER_COUNT {
            let mut reg = Registry::new();
            styled_encoder(&mut reg, source);
            encoder_all(&mut reg, source, false).unwrap();
            let once = reg.clone();
            encoder_all(&mut reg, source, false).unwrap();
            assert_eq!(reg, once);
            for i in 0..ENCODER_COUNT {
                assert_eq!(reg.encoder_ring_mode(i).unwrap(), RingMode::Spread);
                assert_eq!(reg.encoder_mapping(i).unwrap(), 100);
            }
        }
    }

    #[test]
    fn test_encoder_all_leaves_led_addressing() {
        let mut reg = Registry::new();
        styled_encoder(&mut reg, 2);
        encoder_all(&mut reg, 2, false).unwrap();
        assert_eq!(reg.encoder_led_mapping(0).unwrap(), 79);
        assert_eq!(reg.encoder_led_mapping(6).unwrap(), 85);
    }

    #[test]
    fn test_encoder_row_swaps_columns() {
        let mut reg = Registry::new();
        styled_encoder(&mut reg, 2);
        encoder_row(&mut reg, 2, true).unwrap();
        assert_eq!(reg.encoder_speed(5).unwrap(), 2);
        assert_eq!(reg.encoder_mapping(5).unwrap(), 61);
        assert_eq!(reg.encoder_speed(1).unwrap(), 5);

        let mut reg = Registry::new();
        styled_encoder(&mut reg, 4);
        encoder_row(&mut reg, 4, false).unwrap();
        assert_eq!(reg.encoder_mapping(1).unwrap(), 100);
        assert_eq!(reg.encoder_ring_mode(0).unwrap(), RingMode::Eq);
    }

    #[test]
    fn test_encoder_column() {
        let mut reg = Registry::new();
        styled_encoder(&mut reg, 6);
        encoder_column(&mut reg, 6, true).unwrap();
        for i in 0..ENCODER_COUNT {
            let expected = (4..=6).contains(&i);
            assert_eq!(reg.encoder_relative_mode(i).unwrap(), expected, "encoder {}", i);
        }
    }

    #[test]
    fn test_big_encoder_rejected_for_row_and_column() {
        let mut reg = Registry::new();
        assert!(matches!(encoder_row(&mut reg, 0, false), Err(Error::Index { .. })));
        assert!(encoder_column(&mut reg, 0, false).is_err());
        assert!(encoder_column(&mut reg, 7, false).is_err());
    }

    #[test]
    fn test_pots_and_pads_validate_only() {
        let mut reg = Registry::new();
        reg.set_potentiometer_mapping(0, 3).unwrap();
        reg.mark_synced();
        let before = reg.clone();

        propagate_potentiometers(&mut reg, PotentiometerScope::All, 0, false).unwrap();
        propagate_potentiometers(&mut reg, PotentiometerScope::Faders, 2, false).unwrap();
        propagate_pads(&mut reg, PadScope::Row, 7, false).unwrap();
        assert_eq!(reg, before);
        assert!(reg.is_synced());

        assert!(propagate_potentiometers(&mut reg, PotentiometerScope::All, 5, true).is_err());
        assert!(propagate_pads(&mut reg, PadScope::Column, 8, true).is_err());
    }

    #[test]
    fn test_propagation_unsyncs_on_change() {
        let mut reg = Registry::new();
        styled_encoder(&mut reg, 1);
        reg.mark_synced();
        encoder_column(&mut reg, 1, true).unwrap();
        assert!(!reg.is_synced());
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("Grid".parse::<ButtonScope>().unwrap(), ButtonScope::Grid);
        assert_eq!("faders".parse::<PotentiometerScope>().unwrap(), PotentiometerScope::Faders);
        assert!("diagonal".parse::<EncoderScope>().is_err());
        assert_eq!(PadScope::Column.to_string(), "column");
    }
}
