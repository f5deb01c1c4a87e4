//! Server and client configuration.
//!
//! Both configs start from built-in defaults and take overrides from
//! `PAIRPLAY_*` environment variables. Blank variables are ignored; values
//! that are present but unusable are an error rather than a silent default.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const BIND_ADDR_ENV: &str = "PAIRPLAY_BIND_ADDR";
pub const IDLE_TIMEOUT_ENV: &str = "PAIRPLAY_IDLE_TIMEOUT_SECS";
pub const MAX_NAME_LEN_ENV: &str = "PAIRPLAY_MAX_NAME_LEN";
pub const SERVER_ENDPOINT_ENV: &str = "PAIRPLAY_SERVER_ENDPOINT";

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Settings for a [`PairplayServer`](crate::PairplayServer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// A connection that sends nothing for this long is disconnected.
    pub idle_timeout: Duration,

    /// Longest accepted display name, in characters, after trimming.
    pub max_name_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:4000".to_string(),
            idle_timeout: Duration::from_secs(30),
            max_name_len: 32,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = read(&lookup, BIND_ADDR_ENV) {
            config.bind_addr = addr;
        }
        if let Some(secs) = parse_positive::<u64, _>(&lookup, IDLE_TIMEOUT_ENV)? {
            config.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(len) = parse_positive::<usize, _>(&lookup, MAX_NAME_LEN_ENV)? {
            config.max_name_len = len;
        }

        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Settings for a [`PairplayClient`](crate::PairplayClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket URL of the server, `ws://` or `wss://`.
    pub server_endpoint: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_endpoint: "ws://127.0.0.1:4000".to_string(),
        }
    }
}

impl ClientConfig {
    /// Points at `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            server_endpoint: endpoint.into(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(endpoint) = read(&lookup, SERVER_ENDPOINT_ENV) {
            if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
                return Err(ConfigError::InvalidValue {
                    key: SERVER_ENDPOINT_ENV,
                    value: endpoint,
                    reason: "expected a ws:// or wss:// URL".into(),
                });
            }
            config.server_endpoint = endpoint;
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reads a key, treating blank values as unset.
fn read<F>(lookup: &F, key: &'static str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        tracing::warn!(key, "ignoring blank config value, using default");
        return None;
    }
    Some(trimmed.to_string())
}

fn parse_positive<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialEq + Default,
    T::Err: std::fmt::Display,
{
    let Some(raw) = read(lookup, key) else {
        return Ok(None);
    };
    let value = raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    if value == T::default() {
        return Err(ConfigError::InvalidValue {
            key,
            value: raw,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_server_config_defaults_without_env() {
        let config = ServerConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr, "127.0.0.1:4000");
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
        assert_eq!(config.max_name_len, 32);
    }

    #[test]
    fn test_server_config_env_overrides() {
        let config = ServerConfig::from_lookup(env(&[
            (BIND_ADDR_ENV, "0.0.0.0:9000"),
            (IDLE_TIMEOUT_ENV, "5"),
            (MAX_NAME_LEN_ENV, " 12 "),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
        assert_eq!(config.max_name_len, 12);
    }

    #[test]
    fn test_server_config_blank_value_keeps_default() {
        let config = ServerConfig::from_lookup(env(&[(BIND_ADDR_ENV, "   ")])).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:4000");
    }

    #[test]
    fn test_server_config_bad_number_is_error() {
        let err = ServerConfig::from_lookup(env(&[(IDLE_TIMEOUT_ENV, "soon")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: IDLE_TIMEOUT_ENV, .. }
        ));
    }

    #[test]
    fn test_server_config_zero_is_error() {
        let err = ServerConfig::from_lookup(env(&[(MAX_NAME_LEN_ENV, "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_client_config_reads_endpoint() {
        let config =
            ClientConfig::from_lookup(env(&[(SERVER_ENDPOINT_ENV, "wss://play.example.com/ws")]))
                .unwrap();
        assert_eq!(config.server_endpoint, "wss://play.example.com/ws");
        assert_eq!(
            ClientConfig::from_lookup(env(&[])).unwrap(),
            ClientConfig::default()
        );
    }

    #[test]
    fn test_client_config_rejects_non_websocket_url() {
        let err = ClientConfig::from_lookup(env(&[(SERVER_ENDPOINT_ENV, "http://localhost")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: SERVER_ENDPOINT_ENV, .. }
        ));
    }
}
