//! Port for signing and checking bearer credentials.
use async_trait::async_trait;

use crate::domain::{Credential, CredentialClaims};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential signers.
    pub enum CredentialSignerError {
        /// Signature, encoding or expiry check failed.
        Invalid { message: String } => "credential rejected: {message}",
        /// The signer could not produce a credential.
        Signing { message: String } => "credential signing failed: {message}",
    }
}

/// Signs claims into opaque credentials and verifies them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialSigner: Send + Sync {
    /// Produce a credential embedding `claims`.
    async fn sign(&self, claims: &CredentialClaims) -> Result<Credential, CredentialSignerError>;

    /// Check the signature and expiry of `credential` and return its claims.
    async fn verify_signature(
        &self,
        credential: &Credential,
    ) -> Result<CredentialClaims, CredentialSignerError>;
}
