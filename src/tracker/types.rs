use serde::{Deserialize, Serialize};

/// A pointer location in screen coordinates.
///
/// Equality is exact coordinate match. Stillness detection deliberately uses
/// this (no epsilon), so sub-pixel jitter from noisy hardware counts as
/// movement and restarts the dwell streak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Modifier keys held during a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub option: bool,
    pub command: bool,
}

impl Modifiers {
    /// True if every modifier set in `required` is also set here.
    /// Extra held modifiers do not disqualify a chord.
    pub fn contains(&self, required: Modifiers) -> bool {
        (!required.shift || self.shift)
            && (!required.control || self.control)
            && (!required.option || self.option)
            && (!required.command || self.command)
    }
}

/// A key-down event delivered by a platform listener.
///
/// `timestamp_us` is the OS event timestamp. When the same physical key press
/// is delivered through both the global and the local monitor, both copies
/// carry the identical timestamp, which is what the dispatcher keys its
/// de-duplication on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub key_code: u16,
    pub modifiers: Modifiers,
    pub timestamp_us: u64,
}
