//! # Pairplay
//!
//! Pairs two anonymous players for a short game of rock-paper-scissors or
//! tic-tac-toe, relays their moves, and computes the result on the server.
//!
//! This crate is the boundary: it accepts WebSocket connections, turns
//! frames into [`ClientEvent`](pairplay_protocol::ClientEvent)s, runs them
//! through the [`Gateway`], and writes the resulting notices back out. The
//! matchmaking rules themselves live in `pairplay-match`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pairplay::prelude::*;
//!
//! # async fn run() -> Result<(), PairplayError> {
//! let server = PairplayServer::builder().bind("0.0.0.0:4000").build().await?;
//! server.run().await
//! # }
//! ```

mod client;
mod config;
mod error;
mod gateway;
mod handler;
mod server;

pub use client::PairplayClient;
pub use config::{
    BIND_ADDR_ENV, ClientConfig, IDLE_TIMEOUT_ENV, MAX_NAME_LEN_ENV, SERVER_ENDPOINT_ENV,
    ServerConfig,
};
pub use error::{ConfigError, PairplayError};
pub use gateway::{Gateway, Outbox};
pub use server::{PairplayServer, PairplayServerBuilder};

/// Everything needed to run a server or write a client.
pub mod prelude {
    pub use crate::{
        ClientConfig, ConfigError, Gateway, PairplayClient, PairplayError, PairplayServer,
        PairplayServerBuilder, ServerConfig,
    };
    pub use pairplay_match::{Lobby, MatchError, MoveViolation, PlayerStatus, SessionPhase};
    pub use pairplay_protocol::{
        Board, Choice, ClientEvent, ConnectionId, Envelope, Mark, Outcome, RejectReason, Score,
        Seat, ServerEvent, SessionId, Variant,
    };
}
