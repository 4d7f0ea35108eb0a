//! Pointer tracking core
//!
//! One engine task owns all mutable state (permission flag, dwell streak,
//! hotkey de-dup memory) and runs every timer tick and command handler on a
//! single serialized context, so none of it needs locking. Timers are fixed
//! `tokio::time::interval`s; key events from the OS listeners and entry-point
//! calls from the presentation layer arrive as messages on one channel.

pub mod dwell;
pub mod hotkey;
pub mod state;
pub mod types;

pub use dwell::{DwellTracker, DWELL_THRESHOLD, SAMPLE_INTERVAL};
pub use hotkey::{ChordFilter, RESET_KEY_CODE, RESET_MODIFIERS};
pub use state::{TrackerSnapshot, TrackerState};
pub use types::{KeyEvent, Modifiers, PointerPosition};

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::platform::{InputBackend, ListenerHandle, ListenerScope};

/// Cadence of the permission re-check while trust has not been granted.
pub const PERMISSION_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Errors that can occur in the tracker core.
///
/// Apart from listener registration, which leaves the hotkey feature inert
/// and is therefore surfaced at construction, every failure here is handled
/// internally by degrading to a no-op and retrying on the next tick.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Key listener registration failed: {0}")]
    ListenerRegistration(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Unsupported platform: {0}")]
    Unsupported(String),
}

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Messages handled by the engine task.
pub(crate) enum Command {
    Key(KeyEvent),
    TriggerReset,
    RequestPermission,
    Stop,
}

/// Cloneable handle exposed to the presentation layer.
#[derive(Clone)]
pub struct TrackerHandle {
    tx: mpsc::UnboundedSender<Command>,
    updates: watch::Receiver<TrackerSnapshot>,
}

impl TrackerHandle {
    /// Non-blocking read of the current `{granted, saved_position}` state.
    pub fn snapshot(&self) -> TrackerSnapshot {
        self.updates.borrow().clone()
    }

    /// Receiver that is notified whenever the snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.updates.clone()
    }

    /// Re-run the permission handshake. Safe to call at any time; a call
    /// while already granted is a no-op.
    pub fn request_permission(&self) {
        let _ = self.tx.send(Command::RequestPermission);
    }

    /// Restore the pointer to the saved position, exactly as the hotkey
    /// would. Silently does nothing when ungranted or nothing is saved.
    pub fn trigger_reset(&self) {
        let _ = self.tx.send(Command::TriggerReset);
    }
}

/// The tracker core: permission gate, dwell detector and hotkey dispatcher
/// wired together around one engine task.
///
/// The process root constructs exactly one of these and keeps it alive for
/// the process lifetime; dropping it (or calling [`Tracker::stop`]) cancels
/// the timers and deregisters both key listeners.
pub struct Tracker {
    handle: TrackerHandle,
    listeners: Vec<ListenerHandle>,
    engine: Option<JoinHandle<()>>,
}

impl Tracker {
    /// Registers both key listeners, starts the engine task and kicks off the
    /// permission handshake.
    ///
    /// Must be called from within a tokio runtime. Fails only if a key
    /// listener cannot be registered, since the hotkey feature would be
    /// entirely inert without one.
    pub fn spawn(backend: Arc<dyn InputBackend>) -> TrackerResult<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = TrackerState::new();
        let updates = state.subscribe();

        let mut listeners = Vec::with_capacity(2);
        for scope in [ListenerScope::Global, ListenerScope::Local] {
            let events = tx.clone();
            let listener = backend.register_key_listener(
                scope,
                Box::new(move |event| {
                    let _ = events.send(Command::Key(event));
                }),
            )?;
            listeners.push(listener);
        }

        let engine = Engine {
            backend,
            state,
            dwell: DwellTracker::new(),
            chord: ChordFilter::new(),
            granted: false,
        };
        let engine = tokio::spawn(engine.run(rx));

        Ok(Self {
            handle: TrackerHandle { tx, updates },
            listeners,
            engine: Some(engine),
        })
    }

    pub fn handle(&self) -> TrackerHandle {
        self.handle.clone()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        self.handle.snapshot()
    }

    /// Stops monitoring: cancels the engine's timers and deregisters both key
    /// listeners. Idempotent; calling it on an already-stopped tracker does
    /// nothing.
    pub async fn stop(&mut self) {
        for listener in &mut self.listeners {
            listener.cancel();
        }
        let _ = self.handle.tx.send(Command::Stop);
        if let Some(engine) = self.engine.take() {
            let _ = engine.await;
        }
    }
}

/// The single serialized context everything runs on.
struct Engine {
    backend: Arc<dyn InputBackend>,
    state: TrackerState,
    dwell: DwellTracker,
    chord: ChordFilter,
    granted: bool,
}

impl Engine {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        let start = tokio::time::Instant::now();
        let mut sample =
            tokio::time::interval_at(start + SAMPLE_INTERVAL, SAMPLE_INTERVAL);
        sample.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut poll = tokio::time::interval_at(
            start + PERMISSION_POLL_INTERVAL,
            PERMISSION_POLL_INTERVAL,
        );
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.check_and_request();

        loop {
            tokio::select! {
                _ = poll.tick(), if !self.granted => self.poll_trust(),
                _ = sample.tick(), if self.granted => self.sample_tick(),
                command = rx.recv() => match command {
                    Some(Command::Key(event)) => self.handle_key(event),
                    Some(Command::TriggerReset) => self.reset_pointer(),
                    Some(Command::RequestPermission) => self.check_and_request(),
                    Some(Command::Stop) | None => break,
                },
            }
        }

        tracing::info!("Tracker engine stopped");
    }

    /// A trust-query failure is never fatal; it reads as "not granted" and
    /// the 1s poll keeps retrying.
    fn query_trust(&self, prompt: bool) -> bool {
        match self.backend.query_trust(prompt) {
            Ok(granted) => granted,
            Err(err) => {
                tracing::warn!("Trust query failed, treating as not granted: {err}");
                false
            }
        }
    }

    /// The permission handshake. The settings pane and the prompting query
    /// are both user-facing, so each runs at most once per call here; the
    /// repeating re-check is non-prompting.
    fn check_and_request(&mut self) {
        if self.granted {
            return;
        }
        if self.query_trust(false) {
            self.grant();
            return;
        }

        tracing::info!("Input-monitoring permission not granted, redirecting to system settings");
        self.backend.open_permission_settings();
        if self.query_trust(true) {
            self.grant();
        }
        // Otherwise the poll arm keeps checking once per second until granted.
    }

    fn poll_trust(&mut self) {
        tracing::debug!("Checking input-monitoring permission status");
        if self.query_trust(false) {
            self.grant();
        }
    }

    fn grant(&mut self) {
        self.granted = true;
        self.dwell.reset();
        self.state.set_granted();
        tracing::info!("Input-monitoring permission granted, pointer monitoring active");
    }

    fn sample_tick(&mut self) {
        let position = match self.backend.sample_pointer() {
            Ok(position) => position,
            Err(err) => {
                // No-op for this tick; the next tick retries naturally.
                tracing::debug!("Pointer sample failed: {err}");
                return;
            }
        };

        if let Some(settled) = self.dwell.observe(position, SAMPLE_INTERVAL) {
            self.state.set_saved_position(settled);
            tracing::info!(x = settled.x, y = settled.y, "Pointer settled, position saved");
        }
    }

    fn handle_key(&mut self, event: KeyEvent) {
        if self.chord.matches(&event) {
            self.reset_pointer();
        }
    }

    /// The reset action. Ungranted or empty-store calls are normal states,
    /// not errors, and must not touch the saved position.
    fn reset_pointer(&mut self) {
        if !self.granted {
            tracing::debug!("Reset ignored: input-monitoring permission not granted");
            return;
        }
        let Some(position) = self.state.snapshot().saved_position else {
            tracing::debug!("Reset ignored: no position saved yet");
            return;
        };

        match self.backend.inject_pointer_move(position) {
            Ok(()) => {
                tracing::info!(x = position.x, y = position.y, "Pointer restored to saved position")
            }
            Err(err) => tracing::warn!("Pointer injection failed: {err}"),
        }
    }
}
