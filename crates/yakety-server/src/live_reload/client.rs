//! Browser-side live reload client.
//!
//! [`ClientReconnector`] is the transition table the browser script follows;
//! [`render_script`] produces that script from the same constants.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::state::AppState;

/// Prefix of every notification message.
pub(crate) const RELOAD_TAG: &str = "reload:";

/// Host names treated as local development.
pub const LOCAL_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

/// Path of the WebSocket endpoint.
pub(crate) const ENDPOINT: &str = "/ws/live-reload";

/// Connection state of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientState {
    Disconnected,
    Connecting,
    Connected,
}

/// Something that happened to the page or its channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientEvent<'a> {
    PageLoad { hostname: &'a str },
    Opened,
    Message(&'a str),
    Closed,
}

/// What the page should do in response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientAction {
    Connect { url: String },
    Reload,
    Log(&'static str),
}

/// Live reload state machine for one page.
///
/// There is no automatic reconnect: after the channel closes the page stays
/// disconnected until it is reloaded.
#[derive(Debug)]
pub struct ClientReconnector {
    port: u16,
    state: ClientState,
}

impl ClientReconnector {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            state: ClientState::Disconnected,
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Advance the state machine.
    pub fn handle(&mut self, event: ClientEvent<'_>) -> Option<ClientAction> {
        use ClientState::{Connected, Connecting, Disconnected};

        match (self.state, event) {
            (Disconnected, ClientEvent::PageLoad { hostname }) if is_local_host(hostname) => {
                self.state = Connecting;
                Some(ClientAction::Connect {
                    url: format!("ws://{hostname}:{}{ENDPOINT}", self.port),
                })
            }
            (Connecting, ClientEvent::Opened) => {
                self.state = Connected;
                Some(ClientAction::Log("Live reload connected"))
            }
            (Connected, ClientEvent::Message(data)) if data.starts_with(RELOAD_TAG) => {
                Some(ClientAction::Reload)
            }
            (Connecting | Connected, ClientEvent::Closed) => {
                self.state = Disconnected;
                Some(ClientAction::Log("Live reload disconnected"))
            }
            _ => None,
        }
    }
}

/// Exact match against the local development allow-list.
pub fn is_local_host(hostname: &str) -> bool {
    LOCAL_HOSTS.contains(&hostname)
}

/// Render the browser script connecting back to `port`.
pub(crate) fn render_script(port: u16) -> String {
    let hosts = LOCAL_HOSTS
        .iter()
        .map(|h| format!("\"{h}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"(() => {{
  const hosts = [{hosts}];
  if (!hosts.includes(window.location.hostname)) return;
  const ws = new WebSocket(`ws://${{window.location.hostname}}:{port}{ENDPOINT}`);
  ws.onopen = () => console.log("Live reload connected");
  ws.onmessage = (event) => {{
    if (typeof event.data === "string" && event.data.startsWith("{RELOAD_TAG}")) {{
      window.location.reload();
    }}
  }};
  ws.onclose = () => console.log("Live reload disconnected");
}})();
"#
    )
}

/// Serve the browser script.
pub(crate) async fn script_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        render_script(state.client_port),
    )
}
