//! Domain errors.

use thiserror::Error;

use super::event::ClientEventKind;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{kind} is too long ({len} > {max})")]
    TooLong {
        kind: &'static str,
        len: usize,
        max: usize,
    },

    #[error("invalid {kind}: {value}")]
    Invalid { kind: &'static str, value: String },
}

/// Failures of the in-process state stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("membership store unavailable: {0}")]
    Unavailable(String),
}

/// Failures when writing to a connection's outbound queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("push failed: {0}")]
    PushFailed(String),
}

/// Credential rejected at connection time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    NoToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Authentication failed")]
    Unknown,
}

impl AuthError {
    /// Short tag used in logs.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::NoToken => "no_token",
            AuthError::InvalidToken => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::Unknown => "unknown",
        }
    }
}

/// Malformed inbound frame. Never fatal to the connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The frame is not a JSON envelope at all.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// The event name is not one this server handles.
    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    /// A known event carried a payload of the wrong shape.
    #[error("invalid payload for '{}': {reason}", .kind.name())]
    InvalidPayload {
        kind: ClientEventKind,
        reason: String,
    },
}
