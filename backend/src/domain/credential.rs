//! Bearer credentials carried in the `_token` cookie.

use std::fmt;

use chrono::{DateTime, Utc};

use super::user::{DisplayName, UserId};

/// Name of the cookie holding the credential.
pub const CREDENTIAL_COOKIE: &str = "_token";

/// Opaque signed credential string.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw credential value. Blank values are treated as absent.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Borrow the encoded token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(..)")
    }
}

/// Claims embedded in a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialClaims {
    /// Subject user id.
    pub subject: UserId,
    /// Display name at the time of signing.
    pub display_name: DisplayName,
    /// Issue time.
    pub issued_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}
