//! Matchmaking core for Pairplay.
//!
//! Everything here is synchronous and knows nothing about sockets. Callers
//! feed in one request at a time and get back the notices that request
//! produced, addressed by [`ConnectionId`](pairplay_protocol::ConnectionId).
//! Delivering them is the boundary's job.
//!
//! # Key types
//!
//! - [`Lobby`]: the single owner of the pool and the table; every request
//!   goes through it
//! - [`WaitingPool`]: players waiting for an opponent, per variant, FIFO
//! - [`SessionTable`]: live sessions, indexed by id and by participant
//! - [`MatchSession`]: one pairing and its state machine
//! - [`resolve_rps`] / [`resolve_board`]: pure outcome functions
//! - [`MatchError`]: why a request was refused

mod error;
mod lobby;
mod pool;
mod resolver;
mod session;
mod table;

pub use error::{MatchError, MoveViolation};
pub use lobby::{Lobby, PlayerStatus};
pub use pool::{Player, WaitingPool};
pub use resolver::{BoardStatus, WINNING_LINES, resolve_board, resolve_rps};
pub use session::{MatchSession, Outbound, Participant, SessionPhase};
pub use table::SessionTable;
