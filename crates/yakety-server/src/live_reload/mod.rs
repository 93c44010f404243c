//! Live reload for development mode.
//!
//! A filesystem [`ChangeSource`](yakety_watch::ChangeSource) feeds the hub,
//! which fans `reload:<path>` messages out to connected browser tabs over
//! WebSocket.

mod client;
mod dispatcher;
mod hub;
mod manager;
mod registry;
#[cfg(test)]
mod testing;
mod websocket;

pub use client::{
    ClientAction, ClientEvent, ClientReconnector, ClientState, LOCAL_HOSTS, is_local_host,
};
pub(crate) use client::{ENDPOINT, script_handler};
pub(crate) use manager::LiveReloadManager;
pub(crate) use websocket::ws_handler;
