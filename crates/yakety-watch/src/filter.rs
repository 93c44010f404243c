//! Path filtering for change events.

use std::path::{Component, Path, PathBuf};

use glob::Pattern;

use crate::error::WatchError;

/// Check whether any segment of a root-relative path starts with `.`.
///
/// `.git/HEAD`, `build/.cache/x` and `.env` are hidden; `build/app.js` is not.
pub fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|component| match component {
        Component::Normal(segment) => segment.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Decides which raw watcher paths become change events.
///
/// Hidden segments are judged relative to the root, so a root that itself
/// lives under a dot-directory (e.g. `~/.cache/site`) still reports changes.
#[derive(Debug, Clone)]
pub struct PathFilter {
    root: PathBuf,
    canonical_root: Option<PathBuf>,
    patterns: Vec<Pattern>,
}

impl PathFilter {
    /// Create a filter for `root` with optional glob `patterns`.
    ///
    /// Empty `patterns` accepts every non-hidden path under the root.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidPattern`] if a pattern does not compile.
    pub fn new(root: impl Into<PathBuf>, patterns: &[String]) -> Result<Self, WatchError> {
        let root = root.into();
        let canonical_root = std::fs::canonicalize(&root).ok();
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|source| WatchError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            root,
            canonical_root,
            patterns,
        })
    }

    /// Configured root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a raw watcher path to the path reported in change events.
    ///
    /// Returns `None` for paths outside the root, hidden paths, and paths not
    /// matching any configured pattern. Accepted paths are re-expressed under
    /// the configured root so platforms reporting canonical paths still yield
    /// `html/build/app.js` for a root of `html`.
    pub fn accept(&self, path: &Path) -> Option<PathBuf> {
        let relative = self.relative(path)?;

        if is_hidden(relative) {
            return None;
        }

        if !self.patterns.is_empty() && !self.patterns.iter().any(|p| p.matches_path(relative)) {
            return None;
        }

        if relative.as_os_str().is_empty() {
            return Some(self.root.clone());
        }

        Some(self.root.join(relative))
    }

    fn relative<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.strip_prefix(&self.root).ok().or_else(|| {
            self.canonical_root
                .as_deref()
                .and_then(|root| path.strip_prefix(root).ok())
        })
    }
}
