//! Fallback backend for platforms without an input implementation.
//!
//! Keeps the process alive but inert: trust never reports granted, so the
//! engine sits in its 1s permission poll and never samples. Matches the
//! core's degrade-silently error design.

use std::sync::Once;

use crate::platform::{InputBackend, KeyHandler, ListenerHandle, ListenerScope};
use crate::tracker::types::PointerPosition;
use crate::tracker::{TrackerError, TrackerResult};

pub struct UnsupportedBackend;

impl UnsupportedBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnsupportedBackend {
    fn default() -> Self {
        Self::new()
    }
}

static WARN_ONCE: Once = Once::new();

fn warn_unsupported() {
    WARN_ONCE.call_once(|| {
        tracing::warn!("No input backend for this platform; tracker stays inactive");
    });
}

impl InputBackend for UnsupportedBackend {
    fn query_trust(&self, _prompt: bool) -> TrackerResult<bool> {
        warn_unsupported();
        Ok(false)
    }

    fn open_permission_settings(&self) {}

    fn sample_pointer(&self) -> TrackerResult<PointerPosition> {
        Err(TrackerError::Unsupported("pointer sampling".into()))
    }

    fn inject_pointer_move(&self, _position: PointerPosition) -> TrackerResult<()> {
        Err(TrackerError::Unsupported("pointer injection".into()))
    }

    fn register_key_listener(
        &self,
        _scope: ListenerScope,
        _handler: KeyHandler,
    ) -> TrackerResult<ListenerHandle> {
        Ok(ListenerHandle::noop())
    }
}
