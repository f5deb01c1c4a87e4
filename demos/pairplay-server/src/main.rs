//! Standalone Pairplay server.
//!
//! Settings come from `PAIRPLAY_*` environment variables; command-line
//! flags win over both env and defaults. Log filtering follows `RUST_LOG`.
//!
//! ```text
//! RUST_LOG=pairplay=debug cargo run -p pairplay-server -- --bind 0.0.0.0:4000
//! ```

use std::time::Duration;

use clap::Parser;
use pairplay::prelude::*;
use tracing_subscriber::EnvFilter;

/// Pairplay - two-player matchmaking for rock-paper-scissors and tic-tac-toe
#[derive(Parser, Debug)]
#[command(name = "pairplay-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to listen on [env: PAIRPLAY_BIND_ADDR]
    #[arg(long)]
    bind: Option<String>,

    /// Seconds of silence before a connection is dropped [env: PAIRPLAY_IDLE_TIMEOUT_SECS]
    #[arg(long)]
    idle_timeout_secs: Option<u64>,

    /// Longest accepted display name [env: PAIRPLAY_MAX_NAME_LEN]
    #[arg(long)]
    max_name_len: Option<usize>,
}

impl Args {
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(secs) = self.idle_timeout_secs.filter(|s| *s > 0) {
            config.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(len) = self.max_name_len.filter(|l| *l > 0) {
            config.max_name_len = len;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), PairplayError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.apply(ServerConfig::from_env()?);
    tracing::info!(?config, "starting Pairplay server");

    let server = PairplayServer::builder().config(config).build().await?;
    server.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "pairplay-server",
            "--bind",
            "0.0.0.0:9999",
            "--idle-timeout-secs",
            "10",
        ]);
        let config = args.apply(ServerConfig::default());
        assert_eq!(config.bind_addr, "0.0.0.0:9999");
        assert_eq!(config.idle_timeout, Duration::from_secs(10));
        assert_eq!(config.max_name_len, 32);
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let args = Args::parse_from(["pairplay-server"]);
        assert_eq!(args.apply(ServerConfig::default()), ServerConfig::default());
    }
}
