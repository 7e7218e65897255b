//! UseCase 層のエラー

use thiserror::Error;

use crate::domain::RepositoryError;

/// Failure of one client-triggered operation.
///
/// Always local to the triggering connection: the handler answers with
/// `socket:error` and leaves every other connection untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RealtimeError {
    /// The connection has no owner in the registry.
    #[error("connection '{0}' has no registered owner")]
    UnknownConnection(String),

    #[error(transparent)]
    Membership(#[from] RepositoryError),
}
