//! Value objects.
//!
//! Identifiers arrive as untrusted strings (JWT claims, socket payloads, bridge
//! requests). They are validated once here and carried as typed values after.

use std::fmt;

use super::error::ValueObjectError;

/// Upper bound for any identifier used as a map key.
pub const MAX_ID_LENGTH: usize = 256;

fn validate_id(kind: &'static str, value: String) -> Result<String, ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty(kind));
    }
    if value.len() > MAX_ID_LENGTH {
        return Err(ValueObjectError::TooLong {
            kind,
            len: value.len(),
            max: MAX_ID_LENGTH,
        });
    }
    Ok(value)
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                validate_id($kind, value).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueObjectError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Stable user identifier taken from a verified credential.
    UserId,
    "user id"
);

string_id!(
    /// Opaque identifier of one live connection, generated by the transport.
    ConnectionId,
    "connection id"
);

string_id!(
    /// Identifier of a post (the resource a resource channel is keyed by).
    PostId,
    "post id"
);

/// A fan-out group.
///
/// `User` channels hold every connection of one user; `Post` channels hold the
/// connections currently subscribed to a post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelId {
    User(UserId),
    Post(PostId),
}

impl ChannelId {
    pub fn post_id(&self) -> Option<&PostId> {
        match self {
            ChannelId::Post(post_id) => Some(post_id),
            ChannelId::User(_) => None,
        }
    }

    pub fn is_post(&self) -> bool {
        matches!(self, ChannelId::Post(_))
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::User(user_id) => write!(f, "user:{}", user_id),
            ChannelId::Post(post_id) => write!(f, "post:{}", post_id),
        }
    }
}

/// Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
