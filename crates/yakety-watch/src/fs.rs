//! Filesystem change source backed by `notify`.

use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::ChangeSource;
use crate::error::WatchError;
use crate::event::{ChangeEvent, ChangeKind, ChangeReceiver, WatchHandle};
use crate::filter::PathFilter;

/// Convert a `notify::EventKind` to a [`ChangeKind`].
///
/// Returns `None` for event kinds that do not change content (e.g. Access).
fn change_kind(kind: EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Renamed),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

/// Process a notify event result, forwarding accepted paths.
fn forward_notify_event(
    res: Result<notify::Event, notify::Error>,
    filter: &PathFilter,
    tx: &mpsc::UnboundedSender<ChangeEvent>,
) {
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "File watcher reported an error");
            return;
        }
    };
    let Some(kind) = change_kind(event.kind) else {
        return;
    };
    for path in &event.paths {
        let Some(path) = filter.accept(path) else {
            tracing::trace!(path = %path.display(), "Ignoring filtered path");
            continue;
        };
        tracing::debug!(path = %path.display(), %kind, "Recorded filesystem event");
        // Receiver gone means the subscriber shut down; nothing left to notify
        let _ = tx.send(ChangeEvent { path, kind });
    }
}

/// Recursive filesystem watcher for a root directory.
///
/// Native platform watchers only report changes made after the watch is
/// registered, so files already present at subscription time never produce
/// events.
#[derive(Debug, Clone)]
pub struct FsChangeSource {
    root: PathBuf,
    watch_patterns: Vec<String>,
}

impl FsChangeSource {
    /// Watch every non-hidden path under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            watch_patterns: Vec::new(),
        }
    }

    /// Restrict events to paths matching glob `patterns` (relative to the root).
    #[must_use]
    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.watch_patterns = patterns;
        self
    }
}

impl ChangeSource for FsChangeSource {
    fn root(&self) -> &Path {
        &self.root
    }

    fn subscribe(&self) -> Result<(ChangeReceiver, WatchHandle), WatchError> {
        if !self.root.is_dir() {
            return Err(WatchError::MissingRoot(self.root.clone()));
        }

        let filter = PathFilter::new(self.root.clone(), &self.watch_patterns)?;
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            forward_notify_event(res, &filter, &tx);
        })?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;

        tracing::debug!(root = %self.root.display(), "Watching for changes");

        // The watcher owns the sender; dropping the handle closes the receiver
        Ok((ChangeReceiver::new(rx), WatchHandle::new(watcher)))
    }
}
