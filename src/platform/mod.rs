//! Platform-specific input backends
//!
//! The tracker core talks to the host OS through [`InputBackend`]: trust
//! queries, pointer sampling, synthetic pointer moves and key-event
//! listeners. macOS gets the real implementation; everywhere else a stub
//! backend keeps the process alive but inert.

#[cfg(target_os = "macos")]
pub mod macos;

pub mod stub;

use std::sync::Arc;

use crate::tracker::types::{KeyEvent, PointerPosition};
use crate::tracker::TrackerResult;

/// Callback invoked for every key-down event a listener observes.
pub type KeyHandler = Box<dyn Fn(KeyEvent) + Send + Sync + 'static>;

/// Where a key listener observes events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerScope {
    /// System-wide, regardless of which application has focus. Does not fire
    /// for events delivered to this process's own windows on some platforms.
    Global,
    /// Only while this process's windows have focus. Registered alongside
    /// the global listener so the chord works when the app is frontmost.
    Local,
}

/// Cancellation handle for a registered key listener.
///
/// `cancel` is idempotent and also runs on drop. Not `Send`: platform
/// listener tokens (AppKit monitors) must be removed on the thread that
/// created them, so the handle stays with its owner.
pub struct ListenerHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl ListenerHandle {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to cancel, for backends without real listeners.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// OS capabilities the tracker core consumes.
///
/// All calls are synchronous and bounded-latency; the engine invokes them
/// from its single serialized context.
pub trait InputBackend: Send + Sync {
    /// Non-mutating query of the input-monitoring trust state.
    /// `prompt = true` may surface the OS's own one-time authorization
    /// dialog and is only ever issued by the permission gate.
    fn query_trust(&self, prompt: bool) -> TrackerResult<bool>;

    /// Best-effort request to surface the OS permission-settings pane.
    fn open_permission_settings(&self);

    /// Instantaneous read of the current pointer location.
    fn sample_pointer(&self) -> TrackerResult<PointerPosition>;

    /// Best-effort synthetic pointer relocation.
    fn inject_pointer_move(&self, position: PointerPosition) -> TrackerResult<()>;

    /// Register a key-down listener. The returned handle deregisters it.
    fn register_key_listener(
        &self,
        scope: ListenerScope,
        handler: KeyHandler,
    ) -> TrackerResult<ListenerHandle>;
}

/// The real backend for this platform.
pub fn default_backend() -> Arc<dyn InputBackend> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(macos::MacosBackend::new())
    }

    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(stub::UnsupportedBackend::new())
    }
}
