//! Static file serving.
//!
//! Serves the built website from a directory. Anything not matched by an
//! earlier route falls through to here.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Create router serving files from `dir`, with `index.html` for directories.
pub(crate) fn static_router(dir: &Path) -> Router<Arc<AppState>> {
    Router::new().fallback_service(ServeDir::new(dir))
}
