//! Unified error type for Pairplay.

use pairplay_protocol::ProtocolError;
use pairplay_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PairplayError {
    /// A transport-level error (bind, connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A configuration value could not be used.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A configuration value that could not be parsed or is out of range.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}={value:?}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
