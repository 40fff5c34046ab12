//! Mailer that records account emails in the log without sending them.

use async_trait::async_trait;
use tracing::info;
use url::Url;

use crate::domain::AccountToken;
use crate::domain::ports::{Mailer, MailerError, Recipient};

use super::{AccountEmail, CONFIRM_PATH, RESET_PATH, account_link};

const REDACTED: &str = "***";

/// [`Mailer`] for local development. Links are logged with the token
/// replaced, so the log never holds a usable confirmation or reset link.
#[derive(Debug, Clone)]
pub struct LogMailer {
    base_url: Url,
}

impl LogMailer {
    /// Create a mailer whose links point at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    fn redacted_link(&self, segments: &[&str]) -> Result<Url, MailerError> {
        let placeholder = AccountToken::new(REDACTED)
            .ok_or_else(|| MailerError::delivery("redaction placeholder is blank"))?;
        account_link(&self.base_url, segments, &placeholder)
    }

    fn record(recipient: &Recipient, email: &AccountEmail, link: &Url) {
        info!(
            to = %recipient.email,
            subject = email.subject,
            %link,
            "account email not delivered; no SMTP relay configured"
        );
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_confirmation(
        &self,
        recipient: &Recipient,
        _token: &AccountToken,
    ) -> Result<(), MailerError> {
        let link = self.redacted_link(&CONFIRM_PATH)?;
        Self::record(recipient, &AccountEmail::confirmation(recipient, &link), &link);
        Ok(())
    }

    async fn send_password_reset(
        &self,
        recipient: &Recipient,
        _token: &AccountToken,
    ) -> Result<(), MailerError> {
        let link = self.redacted_link(&RESET_PATH)?;
        Self::record(recipient, &AccountEmail::password_reset(recipient, &link), &link);
        Ok(())
    }
}
