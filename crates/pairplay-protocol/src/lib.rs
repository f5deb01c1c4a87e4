//! Wire protocol for Pairplay.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Game values** ([`Variant`], [`Choice`], [`Mark`], [`Board`],
//!   [`Seat`], [`Outcome`], [`Score`], [`Move`]): the vocabulary shared by the
//!   matchmaking core and the wire.
//! - **Events** ([`ClientEvent`], [`ServerEvent`], [`Envelope`]): the closed
//!   set of messages that travel on a connection.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how envelopes become bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while encoding or
//!   decoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope<ClientEvent>) → Gateway → Lobby
//! ```
//!
//! Nothing here knows about queues or sessions; the protocol only describes
//! what may be said.

mod codec;
mod error;
mod events;
mod game;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientEvent, Envelope, PROTOCOL_VERSION, RejectReason, ServerEvent};
pub use game::{BOARD_CELLS, Board, Choice, Mark, Move, Outcome, Score, Seat, SessionId, Variant};
pub use pairplay_transport::ConnectionId;
