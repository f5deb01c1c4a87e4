//! The connection gateway: where wire events become lobby requests.
//!
//! The gateway is synchronous. The async connection handler decodes a frame,
//! locks the gateway, calls [`Gateway::handle`], and unlocks; everything a
//! request produces is pushed onto per-connection outboxes before the lock
//! is released, so each client sees notices in the order the steps ran.

use std::collections::HashMap;
use std::time::Instant;

use pairplay_match::{Lobby, MatchError, Outbound};
use pairplay_protocol::{
    ClientEvent, ConnectionId, Move, PROTOCOL_VERSION, RejectReason, ServerEvent,
};
use tokio::sync::mpsc;

/// Receiving half of a connection's outbox.
pub type Outbox = mpsc::UnboundedReceiver<ServerEvent>;

/// Validates client events and routes them to the [`Lobby`].
pub struct Gateway {
    lobby: Lobby,
    outboxes: HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
    max_name_len: usize,
    started: Instant,
}

impl Gateway {
    /// Creates a gateway that accepts display names up to `max_name_len`
    /// characters.
    pub fn new(max_name_len: usize) -> Self {
        Self {
            lobby: Lobby::new(),
            outboxes: HashMap::new(),
            max_name_len,
            started: Instant::now(),
        }
    }

    /// Registers a connection and queues its `welcome`.
    ///
    /// The returned outbox yields every event addressed to the connection
    /// until [`disconnect`](Self::disconnect) drops the sending half.
    pub fn connect(&mut self, connection_id: ConnectionId) -> Outbox {
        let (tx, rx) = mpsc::unbounded_channel();
        self.outboxes.insert(connection_id, tx);
        self.send(
            connection_id,
            ServerEvent::Welcome {
                connection_id,
                protocol_version: PROTOCOL_VERSION,
            },
        );
        tracing::debug!(%connection_id, "connection registered");
        rx
    }

    /// Handles one decoded event from `connection_id`.
    ///
    /// Refusals go back to the sender as `rejected`; nothing else changes.
    pub fn handle(&mut self, connection_id: ConnectionId, event: ClientEvent) {
        if !self.outboxes.contains_key(&connection_id) {
            tracing::debug!(
                %connection_id,
                kind = event.kind(),
                "event from unregistered connection"
            );
            return;
        }
        tracing::debug!(%connection_id, kind = event.kind(), "client event");

        let result = match event {
            ClientEvent::Join {
                display_name,
                variant,
            } => {
                let name = display_name.trim();
                if name.is_empty() || name.chars().count() > self.max_name_len {
                    self.reject(
                        connection_id,
                        RejectReason::InvalidName,
                        format!(
                            "display name must be 1 to {} characters",
                            self.max_name_len
                        ),
                    );
                    return;
                }
                self.lobby.join(connection_id, name, variant)
            }

            ClientEvent::Move { choice, cell_index } => {
                let Some(mv) = Move::from_parts(choice, cell_index) else {
                    self.reject(
                        connection_id,
                        RejectReason::InvalidMove,
                        "a move carries exactly one of choice or cellIndex".into(),
                    );
                    return;
                };
                self.lobby.submit_move(connection_id, mv)
            }

            ClientEvent::Rematch => self.lobby.rematch(connection_id),

            ClientEvent::Leave => self.lobby.leave(connection_id),

            ClientEvent::Ping { client_time } => {
                let server_time = self.uptime_ms();
                self.send(
                    connection_id,
                    ServerEvent::Pong {
                        client_time,
                        server_time,
                    },
                );
                return;
            }
        };

        match result {
            Ok(out) => self.deliver(out),
            Err(err) => self.refuse(connection_id, err),
        }
    }

    /// Sends `rejected` to one connection.
    pub fn reject(&mut self, connection_id: ConnectionId, reason: RejectReason, message: String) {
        tracing::debug!(%connection_id, ?reason, %message, "request rejected");
        self.send(connection_id, ServerEvent::Rejected { reason, message });
    }

    /// Detaches a closed connection: leaves the queue or ends its session,
    /// tells the opponent, and drops the outbox. Safe to call twice.
    pub fn disconnect(&mut self, connection_id: ConnectionId) {
        let out = self.lobby.disconnect(connection_id);
        self.deliver(out);
        if self.outboxes.remove(&connection_id).is_some() {
            tracing::info!(%connection_id, "connection detached");
        }
    }

    pub fn is_connected(&self, connection_id: ConnectionId) -> bool {
        self.outboxes.contains_key(&connection_id)
    }

    pub fn connection_count(&self) -> usize {
        self.outboxes.len()
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    /// When this gateway was created. Outbound timestamps count from here.
    pub fn started(&self) -> Instant {
        self.started
    }

    fn uptime_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn refuse(&mut self, connection_id: ConnectionId, err: MatchError) {
        self.reject(connection_id, err.reason(), err.to_string());
    }

    fn deliver(&mut self, out: Vec<Outbound>) {
        for Outbound { to, event } in out {
            self.send(to, event);
        }
    }

    fn send(&mut self, to: ConnectionId, event: ServerEvent) {
        let Some(tx) = self.outboxes.get(&to) else {
            tracing::debug!(connection_id = %to, "dropping event for unknown connection");
            return;
        };
        if tx.send(event).is_err() {
            // Writer already gone; the handler's disconnect will follow.
            tracing::debug!(connection_id = %to, "outbox closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use pairplay_match::PlayerStatus;
    use pairplay_protocol::{Choice, Outcome, Variant};

    use super::*;

    const ALICE: ConnectionId = ConnectionId::new(1);
    const BOB: ConnectionId = ConnectionId::new(2);

    fn drain(rx: &mut Outbox) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn join(name: &str, variant: Variant) -> ClientEvent {
        ClientEvent::Join {
            display_name: name.into(),
            variant,
        }
    }

    fn last_rejection(rx: &mut Outbox) -> RejectReason {
        match drain(rx).pop() {
            Some(ServerEvent::Rejected { reason, .. }) => reason,
            other => panic!("expected rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_connect_sends_welcome_first() {
        let mut gateway = Gateway::new(32);
        let mut rx = gateway.connect(ALICE);
        assert_eq!(
            drain(&mut rx),
            vec![ServerEvent::Welcome {
                connection_id: ALICE,
                protocol_version: PROTOCOL_VERSION,
            }]
        );
        assert!(gateway.is_connected(ALICE));
    }

    #[test]
    fn test_join_trims_display_name() {
        let mut gateway = Gateway::new(32);
        let mut alice = gateway.connect(ALICE);
        let mut bob = gateway.connect(BOB);
        gateway.handle(ALICE, join("  Alice  ", Variant::RockPaperScissors));
        gateway.handle(BOB, join("Bob", Variant::RockPaperScissors));

        drain(&mut alice);
        let events = drain(&mut bob);
        assert!(matches!(
            &events[1],
            ServerEvent::OpponentFound { opponent_name, .. } if opponent_name == "Alice"
        ));
    }

    #[test]
    fn test_join_with_blank_or_long_name_is_invalid_name() {
        let mut gateway = Gateway::new(5);
        let mut rx = gateway.connect(ALICE);
        drain(&mut rx);

        gateway.handle(ALICE, join("   ", Variant::RockPaperScissors));
        assert_eq!(last_rejection(&mut rx), RejectReason::InvalidName);

        gateway.handle(ALICE, join("Alexandra", Variant::RockPaperScissors));
        assert_eq!(last_rejection(&mut rx), RejectReason::InvalidName);
        assert_eq!(gateway.lobby().status(ALICE), PlayerStatus::Unknown);
    }

    #[test]
    fn test_move_needs_exactly_one_field() {
        let mut gateway = Gateway::new(32);
        let mut rx = gateway.connect(ALICE);
        drain(&mut rx);

        gateway.handle(
            ALICE,
            ClientEvent::Move {
                choice: Some(Choice::Rock),
                cell_index: Some(3),
            },
        );
        assert_eq!(last_rejection(&mut rx), RejectReason::InvalidMove);

        gateway.handle(
            ALICE,
            ClientEvent::Move {
                choice: None,
                cell_index: None,
            },
        );
        assert_eq!(last_rejection(&mut rx), RejectReason::InvalidMove);
    }

    #[test]
    fn test_negative_cell_index_is_invalid_move() {
        let mut gateway = Gateway::new(32);
        let mut alice = gateway.connect(ALICE);
        let mut bob = gateway.connect(BOB);
        gateway.handle(ALICE, join("Alice", Variant::TicTacToe));
        gateway.handle(BOB, join("Bob", Variant::TicTacToe));
        drain(&mut alice);
        drain(&mut bob);

        gateway.handle(
            ALICE,
            ClientEvent::Move {
                choice: None,
                cell_index: Some(-1),
            },
        );
        assert_eq!(last_rejection(&mut alice), RejectReason::InvalidMove);
        assert!(drain(&mut bob).is_empty());
    }

    #[test]
    fn test_match_errors_go_to_sender_only() {
        let mut gateway = Gateway::new(32);
        let mut alice = gateway.connect(ALICE);
        let mut bob = gateway.connect(BOB);
        gateway.handle(ALICE, join("Alice", Variant::RockPaperScissors));
        gateway.handle(BOB, join("Bob", Variant::RockPaperScissors));
        drain(&mut alice);
        drain(&mut bob);

        gateway.handle(ALICE, ClientEvent::Rematch);
        assert_eq!(last_rejection(&mut alice), RejectReason::RoundInProgress);
        assert!(drain(&mut bob).is_empty());
    }

    #[test]
    fn test_full_rps_round_through_gateway() {
        let mut gateway = Gateway::new(32);
        let mut alice = gateway.connect(ALICE);
        let mut bob = gateway.connect(BOB);
        gateway.handle(ALICE, join("Alice", Variant::RockPaperScissors));
        gateway.handle(BOB, join("Bob", Variant::RockPaperScissors));
        drain(&mut alice);
        drain(&mut bob);

        let throw = |choice| ClientEvent::Move {
            choice: Some(choice),
            cell_index: None,
        };
        gateway.handle(ALICE, throw(Choice::Paper));
        assert_eq!(drain(&mut alice), vec![ServerEvent::MoveLocked]);
        assert!(drain(&mut bob).is_empty());

        gateway.handle(BOB, throw(Choice::Rock));
        let events = drain(&mut bob);
        assert_eq!(events[0], ServerEvent::OpponentMove { choice: Choice::Paper });
        assert!(matches!(
            events[1],
            ServerEvent::Result { outcome: Outcome::WinA, .. }
        ));
    }

    #[test]
    fn test_ping_answers_pong_with_client_time() {
        let mut gateway = Gateway::new(32);
        let mut rx = gateway.connect(ALICE);
        drain(&mut rx);

        gateway.handle(ALICE, ClientEvent::Ping { client_time: 77 });
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [ServerEvent::Pong { client_time: 77, .. }]
        ));
    }

    #[test]
    fn test_leave_without_anything_is_session_not_found() {
        let mut gateway = Gateway::new(32);
        let mut rx = gateway.connect(ALICE);
        drain(&mut rx);

        gateway.handle(ALICE, ClientEvent::Leave);
        assert_eq!(last_rejection(&mut rx), RejectReason::SessionNotFound);
    }

    #[test]
    fn test_disconnect_notifies_opponent_and_closes_outbox() {
        let mut gateway = Gateway::new(32);
        let mut alice = gateway.connect(ALICE);
        let mut bob = gateway.connect(BOB);
        gateway.handle(ALICE, join("Alice", Variant::TicTacToe));
        gateway.handle(BOB, join("Bob", Variant::TicTacToe));
        drain(&mut alice);
        drain(&mut bob);

        gateway.disconnect(BOB);
        gateway.disconnect(BOB);
        assert_eq!(drain(&mut alice), vec![ServerEvent::OpponentLeft]);
        assert!(matches!(
            bob.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
        assert_eq!(gateway.connection_count(), 1);
    }

    #[test]
    fn test_events_from_unregistered_connection_are_ignored() {
        let mut gateway = Gateway::new(32);
        gateway.handle(ALICE, join("Alice", Variant::RockPaperScissors));
        assert_eq!(gateway.lobby().status(ALICE), PlayerStatus::Unknown);
    }
}
