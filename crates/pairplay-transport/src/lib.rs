//! Transport layer for Pairplay.
//!
//! Provides the [`Transport`] and [`Connection`] traits the server is written
//! against, the [`ConnectionId`] that names every live client, and a
//! WebSocket implementation.
//!
//! The rest of the stack assumes what this layer promises: each connection is
//! a reliable, ordered, full-duplex message channel. Retransmission and
//! reconnection are not handled here or anywhere above.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{ClientConnection, WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Opaque identifier for one live connection.
///
/// Allocated by the transport when a client connects and never reused while
/// the process runs. The matchmaking core keys queue entries and sessions by
/// this value, so a client that reconnects is a brand-new participant.
///
/// Serialized as a plain number (`#[serde(transparent)]`) because the server
/// tells each client its own id in the `welcome` event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a `ConnectionId` from a raw `u64`.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Returns the address the transport is listening on.
    ///
    /// Mostly useful after binding to port 0.
    fn local_addr(&self) -> Result<std::net::SocketAddr, Self::Error>;
}

/// A single client connection that carries whole messages.
///
/// `send` and `recv` may be called concurrently from different tasks: the
/// server reads inbound events in one task while a writer task pushes
/// outbound notices.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one message to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Sends a transport-level keepalive. The peer's reply arrives as a
    /// control frame that `recv` consumes without returning.
    async fn ping(&self) -> Result<(), Self::Error>;

    /// Closes the connection. Closing twice is a no-op, and any `send` or
    /// `ping` afterwards fails with [`TransportError::ConnectionClosed`].
    async fn close(&self) -> Result<(), Self::Error>;

    /// How long since the peer last sent a frame of any kind, control
    /// frames included.
    fn idle_for(&self) -> Duration;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
