//! Transport adapter: axum routes, the WebSocket loop and the REST bridge.
//!
//! This is the only layer that writes to sockets.

mod delivery;
mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::{AppState, HeartbeatConfig};
