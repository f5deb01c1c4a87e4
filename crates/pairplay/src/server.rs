//! `PairplayServer` builder and server loop.
//!
//! This is the entry point for running a Pairplay server. It ties together
//! all the layers: transport → protocol → gateway → lobby.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pairplay_protocol::{Codec, JsonCodec};
use pairplay_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::PairplayError;
use crate::config::ServerConfig;
use crate::gateway::Gateway;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The gateway
/// sits behind one lock: each inbound event is one atomic step.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) gateway: Mutex<Gateway>,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
    started: Instant,
}

impl<C: Codec> ServerState<C> {
    /// Milliseconds since the server started; used for frame timestamps.
    pub(crate) fn uptime_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Builder for configuring and starting a Pairplay server.
///
/// # Example
///
/// ```rust,no_run
/// use pairplay::prelude::*;
///
/// # async fn run() -> Result<(), PairplayError> {
/// let server = PairplayServer::builder()
///     .config(ServerConfig::from_env()?)
///     .bind("0.0.0.0:4000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct PairplayServerBuilder {
    config: ServerConfig,
}

impl PairplayServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces every setting at once.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets how long a silent connection is kept.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Sets the longest accepted display name.
    pub fn max_name_len(mut self, len: usize) -> Self {
        self.config.max_name_len = len;
        self
    }

    /// Binds the listener. Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<PairplayServer<JsonCodec>, PairplayError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let gateway = Gateway::new(self.config.max_name_len);
        let started = gateway.started();
        let state = Arc::new(ServerState {
            gateway: Mutex::new(gateway),
            codec: JsonCodec,
            config: self.config,
            started,
        });

        Ok(PairplayServer { transport, state })
    }
}

impl Default for PairplayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A Pairplay server bound to its address.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PairplayServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl PairplayServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> PairplayServerBuilder {
        PairplayServerBuilder::new()
    }
}

impl<C: Codec> PairplayServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, PairplayError> {
        Ok(self.transport.local_addr()?)
    }

    /// The settings the server runs with.
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each connected client. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), PairplayError> {
        tracing::info!(
            addr = %self.state.config.bind_addr,
            idle_timeout = ?self.state.config.idle_timeout,
            "Pairplay server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
