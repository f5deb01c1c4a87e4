//! Client SDK: a thin typed wrapper over one WebSocket connection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use pairplay_protocol::{ClientEvent, Codec, Envelope, JsonCodec, ServerEvent};
use pairplay_transport::{ClientConnection, Connection};

use crate::PairplayError;
use crate::config::ClientConfig;

/// A connection to a Pairplay server.
///
/// Methods take `&self`, so one task can wait in [`recv`](Self::recv)
/// while another sends.
pub struct PairplayClient {
    conn: ClientConnection,
    codec: JsonCodec,
    seq: AtomicU64,
    started: Instant,
}

impl PairplayClient {
    /// Connects to `config.server_endpoint`.
    pub async fn connect(config: &ClientConfig) -> Result<Self, PairplayError> {
        let conn = ClientConnection::connect(&config.server_endpoint).await?;
        Ok(Self {
            conn,
            codec: JsonCodec,
            seq: AtomicU64::new(1),
            started: Instant::now(),
        })
    }

    /// Sends one event in a fresh envelope.
    pub async fn send(&self, event: ClientEvent) -> Result<(), PairplayError> {
        let envelope = Envelope::new(
            self.seq.fetch_add(1, Ordering::Relaxed),
            self.started.elapsed().as_millis() as u64,
            event,
        );
        let bytes = self.codec.encode(&envelope)?;
        self.conn.send(&bytes).await?;
        Ok(())
    }

    /// The next event from the server, or `None` once the server closed the
    /// connection.
    pub async fn recv(&self) -> Result<Option<ServerEvent>, PairplayError> {
        Ok(self.recv_envelope().await?.map(|env| env.event))
    }

    /// Like [`recv`](Self::recv), keeping the server's `seq` and `timestamp`.
    pub async fn recv_envelope(&self) -> Result<Option<Envelope<ServerEvent>>, PairplayError> {
        let Some(data) = self.conn.recv().await? else {
            return Ok(None);
        };
        Ok(Some(self.codec.decode(&data)?))
    }

    /// Closes the connection. The server treats this as a disconnect.
    pub async fn close(&self) -> Result<(), PairplayError> {
        self.conn.close().await?;
        Ok(())
    }
}
