//! Mock change source for testing.
//!
//! Provides [`MockChangeSource`] for exercising live reload without touching
//! the filesystem.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::ChangeSource;
use crate::error::WatchError;
use crate::event::{ChangeEvent, ChangeKind, ChangeReceiver, WatchHandle};
use crate::filter::PathFilter;

/// Mock change source for testing.
///
/// Raw paths passed to [`emit`](Self::emit) go through the same
/// [`PathFilter`] as the filesystem source, so hidden paths never reach
/// subscribers.
///
/// # Example
///
/// ```ignore
/// use yakety_watch::{ChangeKind, ChangeSource, MockChangeSource};
///
/// let source = MockChangeSource::new("html");
/// let (mut events, _handle) = source.subscribe()?;
/// source.emit("html/build/app.js", ChangeKind::Modified);
/// ```
#[derive(Debug)]
pub struct MockChangeSource {
    root: PathBuf,
    filter: PathFilter,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ChangeEvent>>>,
    subscribe_calls: Mutex<usize>,
    fail: bool,
}

impl MockChangeSource {
    /// Create a mock source rooted at `root`.
    ///
    /// # Panics
    ///
    /// Never panics; an empty pattern list always compiles.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let filter = PathFilter::new(root.clone(), &[]).expect("no patterns to compile");
        Self {
            root,
            filter,
            subscribers: Mutex::new(Vec::new()),
            subscribe_calls: Mutex::new(0),
            fail: false,
        }
    }

    /// Make every [`subscribe`](ChangeSource::subscribe) call fail as if the
    /// root were missing.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Emit a raw change for `path`.
    ///
    /// Returns `true` if the path passed the filter and was delivered to at
    /// least one subscriber.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn emit(&self, path: impl AsRef<Path>, kind: ChangeKind) -> bool {
        let Some(path) = self.filter.accept(path.as_ref()) else {
            return false;
        };
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| !tx.is_closed());
        let event = ChangeEvent { path, kind };
        subscribers
            .iter()
            .fold(false, |sent, tx| tx.send(event.clone()).is_ok() || sent)
    }

    /// Number of times [`subscribe`](ChangeSource::subscribe) was called.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn subscribe_calls(&self) -> usize {
        *self.subscribe_calls.lock().unwrap()
    }
}

impl ChangeSource for MockChangeSource {
    fn root(&self) -> &Path {
        &self.root
    }

    fn subscribe(&self) -> Result<(ChangeReceiver, WatchHandle), WatchError> {
        *self.subscribe_calls.lock().unwrap() += 1;

        if self.fail {
            return Err(WatchError::MissingRoot(self.root.clone()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        Ok((ChangeReceiver::new(rx), WatchHandle::no_op()))
    }
}
