/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was already closed on this side.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Opening an outbound connection to a server failed.
    #[error("connect to {endpoint} failed: {source}")]
    ConnectFailed {
        /// The endpoint that was dialed.
        endpoint: String,
        /// What went wrong.
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    /// Wraps any error from the WebSocket library as an I/O error of the
    /// given kind, so callers only deal with `std::io::Error` sources.
    pub fn io<E>(kind: std::io::ErrorKind, err: E) -> std::io::Error
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        std::io::Error::new(kind, err)
    }
}
