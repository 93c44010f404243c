//! Filesystem change source for Yakety live reload.
//!
//! This crate provides the [`ChangeSource`] trait, which abstracts "a directory
//! subtree changed", and [`FsChangeSource`], its implementation on top of the
//! `notify` crate. It handles:
//!
//! - Recursive watching of a configured root directory
//! - Exclusion of hidden paths (any segment starting with `.`)
//! - Optional glob patterns restricting which paths produce events
//! - Event debouncing for callers that want bursts coalesced ([`EventDebouncer`])
//!
//! A [`MockChangeSource`] for testing is available behind the `mock` feature.
//!
//! # Example
//!
//! ```ignore
//! use yakety_watch::{ChangeSource, FsChangeSource};
//!
//! let source = FsChangeSource::new("html");
//! let (mut events, _handle) = source.subscribe()?;
//! while let Some(event) = events.recv().await {
//!     println!("{} {:?}", event.path.display(), event.kind);
//! }
//! ```

mod debouncer;
mod error;
mod event;
mod filter;
mod fs;
#[cfg(feature = "mock")]
mod mock;

pub use debouncer::EventDebouncer;
pub use error::WatchError;
pub use event::{ChangeEvent, ChangeKind, ChangeReceiver, WatchHandle};
pub use filter::{PathFilter, is_hidden};
pub use fs::FsChangeSource;
#[cfg(feature = "mock")]
pub use mock::MockChangeSource;

use std::path::Path;

/// A source of change events for a directory subtree.
///
/// Implementations must only emit events for changes that happen after
/// [`subscribe`](Self::subscribe) returns, and must never emit events for
/// hidden paths.
pub trait ChangeSource: Send + Sync {
    /// Root directory this source reports changes for.
    fn root(&self) -> &Path;

    /// Start watching.
    ///
    /// Events arrive on the returned receiver until the [`WatchHandle`] is
    /// dropped or stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if the watch cannot be established (missing root,
    /// permission denied, invalid pattern).
    fn subscribe(&self) -> Result<(ChangeReceiver, WatchHandle), WatchError>;
}
