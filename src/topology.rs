//! Physical layout of the Tweaker
//!
//! Collections are flat and ordered; the index of a control encodes where it sits
//! on the panel. These helpers are the only place that knows the index ranges.

use std::fmt;
use std::ops::Range;

/// Encoder 0 is the large push encoder above the ring encoders
pub const ENCODER_COUNT: usize = 7;
/// Ring encoders, two columns of three (left 1-3, right 4-6)
pub const RING_ENCODERS: Range<usize> = 1..7;

pub const POTENTIOMETER_COUNT: usize = 5;

/// Allocated button slots; only the first `ACTIVE_BUTTONS` exist on the panel
pub const BUTTON_SLOTS: usize = 50;
pub const ACTIVE_BUTTONS: usize = 43;

pub const GRID_COLUMNS: usize = 8;
pub const GRID: Range<usize> = 0..32;
pub const CONTROL_BUTTONS: Range<usize> = 32..38;
pub const LEFT_CONTROL: Range<usize> = 32..35;
pub const RIGHT_CONTROL: Range<usize> = 35..38;
pub const NAVIGATION: Range<usize> = 38..43;

pub const PAD_COUNT: usize = 8;

/// One RGB light per grid and control button
pub const BUTTON_LED_COUNT: usize = 38;
/// One monochrome light per navigation button
pub const NAV_LED_COUNT: usize = 5;

pub fn is_grid(index: usize) -> bool {
    GRID.contains(&index)
}

pub fn is_control_button(index: usize) -> bool {
    CONTROL_BUTTONS.contains(&index)
}

pub fn is_navigation(index: usize) -> bool {
    NAVIGATION.contains(&index)
}

/// Which group a button belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonDomain {
    Grid,
    Control,
    Navigation,
}

pub fn button_domain(index: usize) -> Option<ButtonDomain> {
    if is_grid(index) {
        Some(ButtonDomain::Grid)
    } else if is_control_button(index) {
        Some(ButtonDomain::Control)
    } else if is_navigation(index) {
        Some(ButtonDomain::Navigation)
    } else {
        None
    }
}

pub fn grid_row(index: usize) -> usize {
    index / GRID_COLUMNS
}

pub fn grid_column(index: usize) -> usize {
    index % GRID_COLUMNS
}

/// Light attached to a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedSlot {
    /// Index into the RGB button lights
    Rgb(usize),
    /// Index into the navigation lights
    Nav(usize),
}

pub fn led_for_button(index: usize) -> Option<LedSlot> {
    if index < BUTTON_LED_COUNT {
        Some(LedSlot::Rgb(index))
    } else if is_navigation(index) {
        Some(LedSlot::Nav(index - NAVIGATION.start))
    } else {
        None
    }
}

/// Navigation cluster, in button index order
///
/// Up, center and down form the vertical stroke of the cross; left, center and
/// right share the horizontal row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Up,
    Center,
    Down,
    Left,
    Right,
}

impl NavDirection {
    pub const ALL: [NavDirection; 5] = [
        NavDirection::Up,
        NavDirection::Center,
        NavDirection::Down,
        NavDirection::Left,
        NavDirection::Right,
    ];

    pub fn from_button(index: usize) -> Option<Self> {
        if is_navigation(index) {
            Some(Self::ALL[index - NAVIGATION.start])
        } else {
            None
        }
    }
}

impl fmt::Display for NavDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NavDirection::Up => "up",
            NavDirection::Center => "center",
            NavDirection::Down => "down",
            NavDirection::Left => "left",
            NavDirection::Right => "right",
        };
        f.write_str(name)
    }
}

/// Navigation buttons that form the horizontal row (center, left, right)
pub const NAV_ROW: [usize; 3] = [39, 41, 42];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PotentiometerKind {
    Knob,
    Fader,
    Crossfader,
}

pub fn potentiometer_kind(index: usize) -> Option<PotentiometerKind> {
    match index {
        0 | 1 => Some(PotentiometerKind::Knob),
        2 | 3 => Some(PotentiometerKind::Fader),
        4 => Some(PotentiometerKind::Crossfader),
        _ => None,
    }
}
