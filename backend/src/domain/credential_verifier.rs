//! Credential verification.
//!
//! Turns the `_token` cookie value into a [`CallerIdentity`]. One signature
//! check and one user lookup per request; nothing is cached.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{CallerVerification, CredentialSigner, UserPersistenceError, UserRepository};
use crate::domain::{AccessError, AuthFailure, CallerIdentity, Credential, Error};

/// Resolves bearer credentials through a signer and user lookup.
#[derive(Clone)]
pub struct CredentialVerifier<S, U> {
    signer: Arc<S>,
    users: Arc<U>,
}

impl<S, U> CredentialVerifier<S, U> {
    /// Create a verifier from its collaborators.
    pub fn new(signer: Arc<S>, users: Arc<U>) -> Self {
        Self { signer, users }
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::internal(format!("unexpected duplicate email: {email}"))
        }
    }
}

impl<S, U> CredentialVerifier<S, U>
where
    S: CredentialSigner,
    U: UserRepository,
{
    async fn resolve(&self, credential: Option<Credential>) -> Result<CallerIdentity, AccessError> {
        let Some(credential) = credential else {
            return Err(AuthFailure::Unauthenticated.into());
        };

        let claims = self
            .signer
            .verify_signature(&credential)
            .await
            .map_err(|err| {
                debug!(error = %err, "credential signature rejected");
                AuthFailure::InvalidCredential
            })?;

        let user = self
            .users
            .find_by_id(&claims.subject)
            .await
            .map_err(map_user_error)?;

        match user {
            Some(user) => Ok(user.identity()),
            None => {
                warn!(user_id = %claims.subject, "credential subject no longer exists");
                Err(AuthFailure::Unauthenticated.into())
            }
        }
    }
}

#[async_trait]
impl<S, U> CallerVerification for CredentialVerifier<S, U>
where
    S: CredentialSigner,
    U: UserRepository,
{
    async fn verify(&self, credential: Option<Credential>) -> Result<CallerIdentity, AccessError> {
        self.resolve(credential).await
    }

    async fn identify(&self, credential: Option<Credential>) -> Option<CallerIdentity> {
        credential.as_ref()?;
        match self.resolve(credential).await {
            Ok(identity) => Some(identity),
            Err(AccessError::Domain(err)) => {
                warn!(error = %err, "optional caller lookup failed");
                None
            }
            Err(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "credential_verifier_tests.rs"]
mod tests;
