//! Command line / environment configuration.

use std::{net::IpAddr, time::Duration};

use clap::Parser;
use thiserror::Error;

#[derive(Parser, Debug, Clone)]
#[command(name = "postwatch-server")]
#[command(about = "Realtime presence and notification relay over WebSocket", long_about = None)]
pub struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// HS256 secret used to verify connection tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Bearer token required on /internal routes (open when unset)
    #[arg(long, env = "INTERNAL_API_TOKEN", hide_env_values = true)]
    pub internal_token: Option<String>,

    /// Interval between server pings
    #[arg(long, env = "PING_INTERVAL_MS", default_value = "25000")]
    pub ping_interval_ms: u64,

    /// A connection silent for this long is closed
    #[arg(long, env = "PING_TIMEOUT_MS", default_value = "60000")]
    pub ping_timeout_ms: u64,

    /// Default log level when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "debug")]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("JWT secret must not be empty")]
    EmptySecret,

    #[error("ping timeout ({timeout_ms}ms) must be longer than ping interval ({interval_ms}ms)")]
    HeartbeatOrder { interval_ms: u64, timeout_ms: u64 },

    #[error("ping interval must be greater than zero")]
    ZeroInterval,
}

/// Validated server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub internal_token: Option<String>,
    pub ping_interval: Duration,
    pub ping_timeout: Duration,
}

impl TryFrom<Args> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if args.jwt_secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if args.ping_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if args.ping_timeout_ms <= args.ping_interval_ms {
            return Err(ConfigError::HeartbeatOrder {
                interval_ms: args.ping_interval_ms,
                timeout_ms: args.ping_timeout_ms,
            });
        }

        Ok(Self {
            host: args.host,
            port: args.port,
            jwt_secret: args.jwt_secret,
            // 空文字は未設定と同じ扱い
            internal_token: args.internal_token.filter(|token| !token.trim().is_empty()),
            ping_interval: Duration::from_millis(args.ping_interval_ms),
            ping_timeout: Duration::from_millis(args.ping_timeout_ms),
        })
    }
}

impl ServerConfig {
    /// `/internal` と `/debug` が無認証のまま外部インターフェースに公開されるか
    pub fn exposes_open_bridge(&self) -> bool {
        self.internal_token.is_none() && !is_loopback_host(&self.host)
    }
}

fn is_loopback_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok_and(|ip| ip.is_loopback())
}
