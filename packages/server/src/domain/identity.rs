//! Identity verification seam.

use super::{entity::Identity, error::AuthError};

/// Validates the credential presented when a connection is opened.
///
/// Verification is pure computation; implementations must not touch any
/// connection state so a rejected handshake leaves nothing behind.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, credential: Option<&str>) -> Result<Identity, AuthError>;
}
