//! Error types for the HTTP server.

use std::net::{AddrParseError, SocketAddr};

/// Server startup and runtime errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Host and port do not form a socket address.
    #[error("Invalid address {address}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    /// Listener could not be bound.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Serving failed after startup.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}
