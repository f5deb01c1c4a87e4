//! Per-connection handler.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a writer task that drains the connection's outbox. The flow is:
//!   1. Register with the gateway → `welcome` is queued
//!   2. Loop: receive frame → decode → gateway step, with a heartbeat tick
//!      that pings the peer and checks how long it has been silent
//!   3. On close, receive error, or idle timeout: detach from the gateway;
//!      the writer flushes what is left and closes the socket
//!
//! Any inbound frame counts as activity, including the pong a client's
//! WebSocket stack sends back for each heartbeat ping.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use pairplay_protocol::{ClientEvent, Codec, ConnectionId, Envelope, RejectReason};
use pairplay_transport::{Connection, WebSocketConnection};

use crate::PairplayError;
use crate::gateway::Outbox;
use crate::server::ServerState;

/// Drop guard that detaches a connection from the gateway when the handler
/// exits, including by panic or early return.
///
/// Since `Drop` is synchronous, we spawn a fire-and-forget task for the
/// async lock.
struct DisconnectGuard<C: Codec> {
    connection_id: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let connection_id = self.connection_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.gateway.lock().await.disconnect(connection_id);
        });
    }
}

/// Handles a single connection from accept to close.
///
/// Returns the transport error when the socket fails mid-read; a clean
/// close or an idle timeout is `Ok`.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), PairplayError> {
    let conn = Arc::new(conn);
    let connection_id = conn.id();
    tracing::info!(%connection_id, "client connected");

    let outbox = state.gateway.lock().await.connect(connection_id);
    let _guard = DisconnectGuard {
        connection_id,
        state: Arc::clone(&state),
    };
    tokio::spawn(write_loop(Arc::clone(&conn), outbox, Arc::clone(&state)));

    let idle_timeout = state.config.idle_timeout;
    let mut heartbeat = tokio::time::interval(heartbeat_period(idle_timeout));
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    heartbeat.tick().await;

    loop {
        let data = tokio::select! {
            biased;
            received = conn.recv() => match received {
                Ok(Some(data)) => data,
                Ok(None) => {
                    tracing::info!(%connection_id, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%connection_id, error = %e, "recv error");
                    return Err(e.into());
                }
            },
            _ = heartbeat.tick() => {
                if conn.idle_for() >= idle_timeout {
                    tracing::info!(%connection_id, "connection idle, disconnecting");
                    break;
                }
                if let Err(e) = conn.ping().await {
                    tracing::debug!(%connection_id, error = %e, "heartbeat ping failed");
                }
                continue;
            }
        };

        let envelope: Envelope<ClientEvent> = match state.codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(%connection_id, error = %e, "failed to decode envelope");
                state.gateway.lock().await.reject(
                    connection_id,
                    RejectReason::Malformed,
                    e.to_string(),
                );
                continue;
            }
        };

        state
            .gateway
            .lock()
            .await
            .handle(connection_id, envelope.event);
    }

    // _guard drops here → gateway disconnect fires, the outbox closes, and
    // the writer task ends.
    Ok(())
}

/// How often the handler pings the peer and checks for silence: three
/// times per idle timeout.
fn heartbeat_period(idle_timeout: Duration) -> Duration {
    (idle_timeout / 3).max(Duration::from_millis(1))
}

/// Encodes outbox events into frames until the gateway drops the sender.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut outbox: Outbox,
    state: Arc<ServerState<C>>,
) {
    let connection_id = conn.id();
    let mut seq: u64 = 1;

    while let Some(event) = outbox.recv().await {
        let envelope = Envelope::new(next_seq(&mut seq), state.uptime_ms(), event);
        let bytes = match state.codec.encode(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(%connection_id, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%connection_id, error = %e, "send failed, stopping writer");
            return;
        }
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(%connection_id, error = %e, "close failed");
    }
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_seq_counts_up_from_current() {
        let mut seq = 1;
        assert_eq!(next_seq(&mut seq), 1);
        assert_eq!(next_seq(&mut seq), 2);
        assert_eq!(seq, 3);
    }

    #[test]
    fn test_heartbeat_period_is_a_third_of_idle_timeout() {
        assert_eq!(
            heartbeat_period(Duration::from_secs(30)),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_heartbeat_period_never_zero() {
        assert_eq!(heartbeat_period(Duration::ZERO), Duration::from_millis(1));
    }
}
