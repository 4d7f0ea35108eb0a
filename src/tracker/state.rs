//! Shared tracker state
//!
//! Holds the permission flag and the single saved position, and publishes
//! them to the presentation layer as a read-only snapshot. Mutation happens
//! only on the engine task (single writer); readers take non-blocking
//! snapshots or subscribe for change notifications.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::tracker::types::PointerPosition;

/// Read-only view consumed by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSnapshot {
    /// Whether the process is trusted to read and inject input events.
    pub granted: bool,
    /// The most recently settled pointer position, if any.
    pub saved_position: Option<PointerPosition>,
}

/// Writer side of the tracker state, owned by the engine.
#[derive(Debug)]
pub struct TrackerState {
    tx: watch::Sender<TrackerSnapshot>,
}

impl TrackerState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(TrackerSnapshot::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        self.tx.borrow().clone()
    }

    /// Trust only ever transitions false -> true within a process lifetime.
    pub fn set_granted(&self) {
        self.tx.send_modify(|state| state.granted = true);
    }

    /// Overwrites the saved position unconditionally; there is no history.
    pub fn set_saved_position(&self, position: PointerPosition) {
        self.tx.send_modify(|state| state.saved_position = Some(position));
    }
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new()
    }
}
