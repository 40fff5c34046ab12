//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on driving
//! ports, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountOperations, CallerVerification, ListingOperations};

use super::cookies::CredentialCookies;

/// Port implementations used by the HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Resolves the credential cookie to a caller.
    pub verifier: Arc<dyn CallerVerification>,
    /// Listing use-cases.
    pub listings: Arc<dyn ListingOperations>,
    /// Account use-cases.
    pub accounts: Arc<dyn AccountOperations>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Resolves the credential cookie to a caller.
    pub verifier: Arc<dyn CallerVerification>,
    /// Listing use-cases.
    pub listings: Arc<dyn ListingOperations>,
    /// Account use-cases.
    pub accounts: Arc<dyn AccountOperations>,
    /// Issues and clears the credential cookie.
    pub cookies: CredentialCookies,
}

impl HttpState {
    /// Build state from ports and the cookie policy.
    pub fn new(ports: HttpStatePorts, cookies: CredentialCookies) -> Self {
        let HttpStatePorts {
            verifier,
            listings,
            accounts,
        } = ports;
        Self {
            verifier,
            listings,
            accounts,
            cookies,
        }
    }
}
