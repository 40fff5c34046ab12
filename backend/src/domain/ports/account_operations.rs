//! Driving port for account use-cases.

use async_trait::async_trait;

use crate::domain::{Credential, Email, Error, LoginCredentials, NewPassword, Registration};

/// Account use-cases: sign-in, registration, confirmation and password reset.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountOperations: Send + Sync {
    /// Check credentials and issue a signed credential.
    async fn login(&self, credentials: &LoginCredentials) -> Result<Credential, Error>;

    /// Create an unconfirmed account and send its confirmation link.
    async fn register(&self, registration: &Registration) -> Result<(), Error>;

    /// Confirm the account holding `token`.
    async fn confirm(&self, token: &str) -> Result<(), Error>;

    /// Send a password reset link when `email` is registered.
    ///
    /// Succeeds whether or not the address belongs to an account.
    async fn request_password_reset(&self, email: &Email) -> Result<(), Error>;

    /// Whether `token` is a pending reset token.
    async fn check_reset_token(&self, token: &str) -> Result<(), Error>;

    /// Set a new password for the account holding `token`.
    async fn reset_password(&self, token: &str, password: &NewPassword) -> Result<(), Error>;
}
