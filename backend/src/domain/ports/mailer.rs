//! Port for account emails.
use async_trait::async_trait;

use crate::domain::{AccountToken, DisplayName, Email};

use super::define_port_error;

define_port_error! {
    /// Errors raised by mailers.
    pub enum MailerError {
        /// The message could not be delivered.
        Delivery { message: String } => "mail delivery failed: {message}",
    }
}

/// Recipient of an account email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Destination address.
    pub email: Email,
    /// Greeting name.
    pub display_name: DisplayName,
}

/// Sends account confirmation and password reset emails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the link that confirms a new account.
    async fn send_confirmation(
        &self,
        recipient: &Recipient,
        token: &AccountToken,
    ) -> Result<(), MailerError>;

    /// Send the link that lets a user choose a new password.
    async fn send_password_reset(
        &self,
        recipient: &Recipient,
        token: &AccountToken,
    ) -> Result<(), MailerError>;
}
