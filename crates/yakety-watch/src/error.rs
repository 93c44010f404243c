//! Watch error types.

use std::path::PathBuf;

/// Error establishing a watch.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Root directory missing or not a directory.
    #[error("Watch root does not exist or is not a directory: {}", .0.display())]
    MissingRoot(PathBuf),

    /// A watch pattern failed to compile.
    #[error("Invalid watch pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying glob error.
        #[source]
        source: glob::PatternError,
    },

    /// Error from the platform watcher.
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),
}
