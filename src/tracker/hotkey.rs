//! Reset hotkey matching
//!
//! The reset chord is fixed for the process lifetime: ⌘ + ⌃ + R. Key events
//! arrive from two listeners (system-wide and app-focused) because the
//! system-wide monitor alone does not fire for self-focused events; both
//! deliveries of one physical key press carry the same OS timestamp, which is
//! what the filter de-duplicates on.

use crate::tracker::types::{KeyEvent, Modifiers};

/// macOS key code for the "R" key on an ANSI layout.
pub const RESET_KEY_CODE: u16 = 15;

/// Modifiers that must all be held for the reset chord.
pub const RESET_MODIFIERS: Modifiers = Modifiers {
    shift: false,
    control: true,
    option: false,
    command: true,
};

/// Matches key-down events against the reset chord and drops duplicate
/// deliveries of the same physical press.
#[derive(Debug, Default)]
pub struct ChordFilter {
    last_fired: Option<(u64, u16)>,
}

impl ChordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly once per physical key-down matching the reset chord.
    pub fn matches(&mut self, event: &KeyEvent) -> bool {
        if event.key_code != RESET_KEY_CODE || !event.modifiers.contains(RESET_MODIFIERS) {
            return false;
        }

        let identity = (event.timestamp_us, event.key_code);
        if self.last_fired == Some(identity) {
            tracing::debug!("duplicate monitor delivery for one key press, ignoring");
            return false;
        }
        self.last_fired = Some(identity);
        true
    }
}
