//! Change event types.
//!
//! Provides the values produced by [`ChangeSource::subscribe`](crate::ChangeSource::subscribe).

use std::fmt;
use std::path::PathBuf;

use tokio::sync::mpsc;

/// Kind of filesystem change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// File or directory was created.
    Created,
    /// File content or metadata was modified.
    Modified,
    /// File or directory was deleted.
    Deleted,
    /// File or directory was renamed (either side of the rename).
    Renamed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
        };
        f.write_str(name)
    }
}

/// A single filesystem change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Changed path, expressed under the configured watch root
    /// (e.g. `html/build/app.js` when the root is `html`).
    pub path: PathBuf,
    /// Kind of change.
    pub kind: ChangeKind,
}

impl ChangeEvent {
    /// Create a new change event.
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Receiver for change events.
///
/// Wraps an unbounded [`tokio::sync::mpsc`] receiver so the synchronous
/// watcher callback can push without blocking.
#[derive(Debug)]
pub struct ChangeReceiver {
    rx: mpsc::UnboundedReceiver<ChangeEvent>,
}

impl ChangeReceiver {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<ChangeEvent>) -> Self {
        Self { rx }
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the source has stopped.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Try to receive an event without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.rx.try_recv().ok()
    }
}

/// Handle keeping a watch alive.
///
/// Uses RAII pattern - dropping the handle stops watching automatically.
pub struct WatchHandle {
    _guard: Option<Box<dyn Send>>,
}

impl WatchHandle {
    /// Create a handle owning the given watcher resource.
    pub(crate) fn new(guard: impl Send + 'static) -> Self {
        Self {
            _guard: Some(Box::new(guard)),
        }
    }

    /// Create a handle that owns nothing.
    #[cfg_attr(not(feature = "mock"), allow(dead_code))]
    pub(crate) fn no_op() -> Self {
        Self { _guard: None }
    }

    /// Stop watching immediately (consumes the handle).
    pub fn stop(mut self) {
        self._guard.take();
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("active", &self._guard.is_some())
            .finish()
    }
}
