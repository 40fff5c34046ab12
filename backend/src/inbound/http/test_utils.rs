//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::cookie::time::Duration;
use actix_web::web;

use crate::domain::ports::{MockAccountOperations, MockCallerVerification, MockListingOperations};
use crate::domain::{
    AccessError, AuthFailure, CREDENTIAL_COOKIE, CallerIdentity, DisplayName, UserId,
};

use super::cookies::CredentialCookies;
use super::state::{HttpState, HttpStatePorts};

/// Credential value the verifier mocks accept.
pub const VALID_TOKEN: &str = "valid-token";

/// Mocked driving ports for handler tests.
#[derive(Default)]
pub struct MockPorts {
    pub verifier: MockCallerVerification,
    pub listings: MockListingOperations,
    pub accounts: MockAccountOperations,
}

impl MockPorts {
    /// Ports whose verifier accepts [`VALID_TOKEN`] as `caller` and rejects
    /// every other cookie as invalid.
    pub fn signed_in_as(caller: &CallerIdentity) -> Self {
        let mut ports = Self::default();
        let verified = caller.clone();
        ports
            .verifier
            .expect_verify()
            .returning(move |credential| match credential {
                Some(token) if token.as_str() == VALID_TOKEN => Ok(verified.clone()),
                Some(_) => Err(AccessError::Auth(AuthFailure::InvalidCredential)),
                None => Err(AccessError::Auth(AuthFailure::Unauthenticated)),
            });
        let identified = caller.clone();
        ports
            .verifier
            .expect_identify()
            .returning(move |credential| {
                credential
                    .filter(|token| token.as_str() == VALID_TOKEN)
                    .map(|_| identified.clone())
            });
        ports
    }

    /// Wrap the mocks in shared handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        self.into_state_with(CredentialCookies::insecure(Duration::hours(1)))
    }

    /// Wrap the mocks in shared handler state issuing `cookies`.
    pub fn into_state_with(self, cookies: CredentialCookies) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            HttpStatePorts {
                verifier: Arc::new(self.verifier),
                listings: Arc::new(self.listings),
                accounts: Arc::new(self.accounts),
            },
            cookies,
        ))
    }
}

/// A signed-in caller for handler tests.
pub fn caller(display_name: &str) -> CallerIdentity {
    CallerIdentity::new(
        UserId::random(),
        DisplayName::new(display_name).expect("fixture display name"),
    )
}

/// Cookie carrying a credential the mocked verifier accepts.
pub fn credential_cookie() -> Cookie<'static> {
    Cookie::new(CREDENTIAL_COOKIE, VALID_TOKEN)
}

/// Cookie carrying a credential the mocked verifier rejects.
pub fn forged_cookie() -> Cookie<'static> {
    Cookie::new(CREDENTIAL_COOKIE, "forged")
}
