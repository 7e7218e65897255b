//! Realtime presence and notification relay.
//!
//! Tracks live WebSocket connections per user, the post channels they are
//! viewing, and fans out presence, read-receipt, typing and notification
//! events to the other connections that should see them.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod bootstrap;
pub mod config;
