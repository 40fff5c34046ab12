//! Building and clearing the credential cookie.

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};

use crate::domain::{CREDENTIAL_COOKIE, Credential};

use super::credential_config::CookiePolicy;

/// Issues and clears the `_token` cookie with consistent attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialCookies {
    policy: CookiePolicy,
    max_age: Duration,
}

impl CredentialCookies {
    /// Cookies with `policy` attributes living for `max_age`.
    pub fn new(policy: CookiePolicy, max_age: Duration) -> Self {
        Self { policy, max_age }
    }

    /// Non-secure `Lax` cookies, for tests and local HTTP.
    pub fn insecure(max_age: Duration) -> Self {
        Self::new(
            CookiePolicy {
                secure: false,
                same_site: SameSite::Lax,
            },
            max_age,
        )
    }

    /// Cookie carrying `credential`.
    pub fn issue(&self, credential: &Credential) -> Cookie<'static> {
        Cookie::build(CREDENTIAL_COOKIE, credential.as_str().to_owned())
            .path("/")
            .http_only(true)
            .secure(self.policy.secure)
            .same_site(self.policy.same_site)
            .max_age(self.max_age)
            .finish()
    }

    /// Expired cookie that makes the browser drop the credential. Carries
    /// the issuing attributes so browsers match it to the stored cookie.
    pub fn clear(&self) -> Cookie<'static> {
        Cookie::build(CREDENTIAL_COOKIE, "")
            .path("/")
            .http_only(true)
            .secure(self.policy.secure)
            .same_site(self.policy.same_site)
            .max_age(Duration::ZERO)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn issued_cookie_is_http_only_and_scoped_to_root() {
        let cookies = CredentialCookies::insecure(Duration::hours(24));
        let credential = Credential::new("signed").expect("non-blank");
        let cookie = cookies.issue(&credential);

        assert_eq!(cookie.name(), CREDENTIAL_COOKIE);
        assert_eq!(cookie.value(), "signed");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::hours(24)));
    }

    #[rstest]
    fn cleared_cookie_expires_immediately() {
        let cookie = CredentialCookies::insecure(Duration::hours(1)).clear();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[rstest]
    #[case(true, SameSite::Strict)]
    #[case(false, SameSite::Lax)]
    fn cleared_cookie_mirrors_issued_attributes(#[case] secure: bool, #[case] same_site: SameSite) {
        let cookies = CredentialCookies::new(CookiePolicy { secure, same_site }, Duration::hours(1));
        let credential = Credential::new("signed").expect("non-blank");

        let issued = cookies.issue(&credential);
        let cleared = cookies.clear();

        assert_eq!(cleared.secure(), issued.secure());
        assert_eq!(cleared.same_site(), issued.same_site());
        assert_eq!(cleared.path(), issued.path());
        assert_eq!(cleared.http_only(), issued.http_only());
    }
}
