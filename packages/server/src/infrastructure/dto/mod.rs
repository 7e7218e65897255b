//! Data Transfer Objects (DTOs) for the realtime layer.
//!
//! DTOs are organized by protocol:
//! - `websocket`: socket frame envelopes and payloads
//! - `http`: REST bridge and inspection bodies

pub mod conversion;
pub mod http;
pub mod websocket;
