//! Driving port resolving bearer credentials to caller identities.
//!
//! Inbound adapters call this once per request before any handler logic runs.

use async_trait::async_trait;

use crate::domain::{AccessError, CallerIdentity, Credential};

/// Credential verification use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallerVerification: Send + Sync {
    /// Resolve a credential to a caller identity.
    ///
    /// Absent credentials and credentials whose subject no longer exists fail
    /// with `Unauthenticated`; bad signatures and expired credentials fail
    /// with `InvalidCredential`. Storage failures surface as domain errors.
    async fn verify(&self, credential: Option<Credential>) -> Result<CallerIdentity, AccessError>;

    /// Best-effort variant for pages that work with or without a caller.
    async fn identify(&self, credential: Option<Credential>) -> Option<CallerIdentity>;
}
