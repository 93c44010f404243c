//! Live reload manager.
//!
//! Connects a [`ChangeSource`] subscription to the hub so every accepted
//! change becomes one broadcast round.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::task::JoinHandle;
use yakety_watch::{
    ChangeEvent, ChangeReceiver, ChangeSource, EventDebouncer, WatchError, WatchHandle,
};

use super::hub::HubHandle;

/// How often pending debounced events are checked.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Owns the change subscription and the task pumping it into the hub.
///
/// Dropping the manager stops the watch.
#[derive(Debug)]
pub(crate) struct LiveReloadManager {
    hub: HubHandle,
    root: PathBuf,
    pump: JoinHandle<()>,
}

impl LiveReloadManager {
    /// Subscribe once to `source` and start forwarding its events.
    ///
    /// A zero `debounce` forwards every event immediately.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the subscription cannot be established.
    pub(crate) fn start(source: &dyn ChangeSource, debounce: Duration) -> Result<Self, WatchError> {
        let (events, handle) = source.subscribe()?;
        let hub = HubHandle::spawn();
        let pump = tokio::spawn(pump_events(events, handle, hub.clone(), debounce));

        tracing::info!(
            root = %source.root().display(),
            debounce_ms = debounce.as_millis(),
            "Live reload watching"
        );

        Ok(Self {
            hub,
            root: source.root().to_path_buf(),
            pump,
        })
    }

    pub(crate) fn hub(&self) -> &HubHandle {
        &self.hub
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for LiveReloadManager {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

async fn pump_events(
    mut events: ChangeReceiver,
    handle: WatchHandle,
    hub: HubHandle,
    debounce: Duration,
) {
    if debounce.is_zero() {
        while let Some(event) = events.recv().await {
            dispatch(&hub, event).await;
        }
    } else {
        let mut debouncer = EventDebouncer::new(debounce);
        let mut interval = tokio::time::interval(POLL_INTERVAL);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => debouncer.record(event),
                    None => break,
                },
                _ = interval.tick() => {
                    for event in debouncer.drain_ready() {
                        dispatch(&hub, event).await;
                    }
                }
            }
        }

        // Source ended; flush whatever is still pending
        tokio::time::sleep(debounce).await;
        for event in debouncer.drain_ready() {
            dispatch(&hub, event).await;
        }
    }

    handle.stop();
    tracing::debug!("Change source closed, live reload pump stopped");
}

async fn dispatch(hub: &HubHandle, event: ChangeEvent) {
    let path = event.path.clone();
    let report = hub.broadcast(event).await;
    tracing::debug!(
        path = %path.display(),
        attempted = report.attempted,
        delivered = report.delivered,
        pruned = report.pruned,
        "Live reload round finished"
    );
}
