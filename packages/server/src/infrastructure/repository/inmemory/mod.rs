//! インメモリ実装
//!
//! 接続とチャンネルの状態はプロセス再起動で失われる前提です。

pub mod channel_membership;
pub mod connection_registry;

pub use channel_membership::InMemoryChannelMembership;
pub use connection_registry::InMemoryConnectionRegistry;
