//! Realtime presence and notification relay server.
//!
//! Run with:
//! ```not_rust
//! JWT_SECRET=change-me cargo run --bin postwatch-server
//! cargo run --bin postwatch-server -- --host 0.0.0.0 --port 5000 --jwt-secret change-me
//! ```

use clap::Parser;
use postwatch_server::{
    bootstrap::build_server,
    config::{Args, ServerConfig},
};
use postwatch_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = match ServerConfig::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    if config.exposes_open_bridge() {
        tracing::warn!(
            host = %config.host,
            "INTERNAL_API_TOKEN is unset: /internal and /debug routes accept unauthenticated requests"
        );
    }

    let server = build_server(&config);
    if let Err(e) = server.run(config.host.clone(), config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
