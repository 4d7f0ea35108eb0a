//! Dwell detection state machine
//!
//! Classifies a stream of pointer samples into still-streaks and reports the
//! moment a streak crosses the dwell threshold, exactly once per streak.

use std::time::Duration;

use crate::tracker::types::PointerPosition;

/// How often the pointer is sampled while monitoring is active.
///
/// Coarse enough to avoid CPU churn from continuous sampling, fine enough
/// that dwell detection feels immediate.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// How long the pointer must sit at one exact coordinate to count as settled.
pub const DWELL_THRESHOLD: Duration = Duration::from_secs(1);

/// Per-streak accumulator state.
///
/// A streak is a maximal run of samples at one exact coordinate. `settled`
/// latches after the threshold crossing so a pointer that stays put for
/// minutes still produces a single settle event. A pointer that oscillates
/// between two coordinates on every sample never accumulates dwell time and
/// never settles; that follows from the exact-equality comparison and is
/// accepted behavior.
#[derive(Debug, Default)]
pub struct DwellTracker {
    last: Option<PointerPosition>,
    still_for: Duration,
    settled: bool,
}

impl DwellTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the current streak, e.g. when monitoring (re)starts.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed one sample taken `elapsed` after the previous one.
    ///
    /// Returns the settled position on the sample that crosses the dwell
    /// threshold, and `None` on every other sample.
    pub fn observe(
        &mut self,
        position: PointerPosition,
        elapsed: Duration,
    ) -> Option<PointerPosition> {
        if self.last == Some(position) {
            self.still_for += elapsed;
            if self.still_for >= DWELL_THRESHOLD && !self.settled {
                self.settled = true;
                return Some(position);
            }
        } else {
            self.last = Some(position);
            self.still_for = Duration::ZERO;
            self.settled = false;
        }
        None
    }
}
