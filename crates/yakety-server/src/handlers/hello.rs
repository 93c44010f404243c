//! Hello API endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Response for GET /api/hello.
#[derive(Debug, Serialize)]
pub(crate) struct HelloResponse {
    message: &'static str,
    timestamp: String,
    environment: &'static str,
}

/// Handle GET /api/hello.
pub(crate) async fn get_hello(State(state): State<Arc<AppState>>) -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello world from Yakety!",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        environment: environment(state.dev),
    })
}

fn environment(dev: bool) -> &'static str {
    if dev { "development" } else { "production" }
}
