//! Authorization failure taxonomy shared by the credential verifier and the
//! ownership guard.
//!
//! Every failure listed here is shown to the caller in the same way by the
//! inbound layer; the variants exist for logging and tests.

use super::error::Error;
use super::user::UserId;

/// Credential verification failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    /// No credential was presented, or its subject no longer exists.
    #[error("caller is not authenticated")]
    Unauthenticated,
    /// The credential failed the signature or expiry check.
    #[error("credential is invalid or expired")]
    InvalidCredential,
}

/// Ownership guard failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardFailure {
    /// The target resource does not exist.
    #[error("resource not found")]
    ResourceNotFound,
    /// The caller does not own the resource.
    #[error("caller does not own the resource")]
    NotOwner,
    /// The resource is in a state that forbids the operation.
    #[error("resource is not in the required state")]
    InvalidState,
}

/// Outcome of a gated operation that did not succeed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AccessError {
    /// Authentication failed.
    #[error(transparent)]
    Auth(#[from] AuthFailure),
    /// Ownership or state check failed.
    #[error(transparent)]
    Guard(#[from] GuardFailure),
    /// Validation or infrastructure failure.
    #[error(transparent)]
    Domain(#[from] Error),
}

/// State precondition applied by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequiredState {
    /// No state precondition.
    #[default]
    Any,
    /// The resource must not be published yet.
    Unpublished,
}

/// Resources that belong to exactly one user.
pub trait OwnedByUser {
    /// Owner identifier.
    fn owner_id(&self) -> &UserId;

    /// Whether `user_id` owns the resource.
    fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.owner_id() == user_id
    }
}
