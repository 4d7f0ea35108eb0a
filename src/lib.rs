//! Stillpoint - remembers where your pointer settles and snaps it back.
//!
//! The tracker samples the pointer at a fixed 100ms cadence, saves the
//! position once it has been still for a full second, and restores it when
//! the global ⌘+⌃+R chord is pressed. Reading and injecting input events
//! requires the host OS's input-monitoring trust, so everything is gated
//! behind a poll-until-granted permission handshake.

pub mod platform;
pub mod tracker;

pub use platform::{InputBackend, KeyHandler, ListenerHandle, ListenerScope};
pub use tracker::{
    KeyEvent, Modifiers, PointerPosition, Tracker, TrackerError, TrackerHandle, TrackerResult,
    TrackerSnapshot,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Run the tracker until interrupted.
///
/// Initializes logging, wires the platform backend to one tracker instance,
/// mirrors state changes into the log as the minimal presentation layer, and
/// tears everything down on ctrl-c. Expects a current-thread runtime: the
/// core is single-context by design and the platform listener handles are
/// not `Send`.
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stillpoint=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Stillpoint v{}", env!("CARGO_PKG_VERSION"));

    let backend = platform::default_backend();
    let mut tracker = Tracker::spawn(backend)?;

    let mut updates = tracker.handle().subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow().clone();
            match serde_json::to_string(&snapshot) {
                Ok(json) => tracing::info!(state = %json, "Tracker state changed"),
                Err(err) => tracing::warn!("Failed to encode tracker state: {err}"),
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Interrupt received, shutting down");
    tracker.stop().await;
    Ok(())
}
