//! Application state.
//!
//! Shared state for all request handlers.

use std::time::Instant;

use crate::live_reload::LiveReloadManager;

/// Application state shared across all handlers.
#[derive(Debug)]
pub(crate) struct AppState {
    /// Live reload manager (if enabled and the watch started).
    pub(crate) live_reload: Option<LiveReloadManager>,
    /// Development mode.
    pub(crate) dev: bool,
    /// Port the browser script connects back to.
    pub(crate) client_port: u16,
    /// Server start time, for uptime reporting.
    pub(crate) started_at: Instant,
}

impl AppState {
    /// Check if live reload is enabled.
    #[must_use]
    pub(crate) fn live_reload_enabled(&self) -> bool {
        self.live_reload.is_some()
    }
}
