//! Mailer delivering account emails through an SMTP relay.

use std::fmt;

use async_trait::async_trait;
use lettre::address::AddressError;
use lettre::message::{Mailbox, MultiPart};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;
use url::Url;

use crate::domain::AccountToken;
use crate::domain::ports::{Mailer, MailerError, Recipient};

use super::{AccountEmail, CONFIRM_PATH, RESET_PATH, account_link};

/// Errors raised while configuring [`SmtpMailer`].
#[derive(Debug, thiserror::Error)]
pub enum SmtpMailerError {
    /// The relay URL could not be parsed.
    #[error("invalid SMTP relay URL: {0}")]
    Relay(#[from] lettre::transport::smtp::Error),
    /// The sender is not a valid mailbox.
    #[error("invalid sender address: {0}")]
    Sender(#[from] AddressError),
}

/// [`Mailer`] sending multipart text and HTML messages over SMTP.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    base_url: Url,
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The transport holds relay credentials.
        f.debug_struct("SmtpMailer")
            .field("from", &self.from.to_string())
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl SmtpMailer {
    /// Connect lazily to `relay_url` (`smtp://` or `smtps://`, credentials in
    /// the userinfo part) and send as `from`.
    pub fn new(relay_url: &str, from: &str, base_url: Url) -> Result<Self, SmtpMailerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(relay_url)?.build();
        let from = from.parse::<Mailbox>()?;
        Ok(Self {
            transport,
            from,
            base_url,
        })
    }

    fn message(&self, recipient: &Recipient, email: AccountEmail) -> Result<Message, MailerError> {
        let address = recipient
            .email
            .as_ref()
            .parse::<Address>()
            .map_err(|err| MailerError::delivery(format!("invalid recipient: {err}")))?;
        Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(Some(recipient.display_name.to_string()), address))
            .subject(email.subject)
            .multipart(MultiPart::alternative_plain_html(email.text, email.html))
            .map_err(|err| MailerError::delivery(format!("could not build message: {err}")))
    }

    async fn deliver(&self, recipient: &Recipient, email: AccountEmail) -> Result<(), MailerError> {
        let subject = email.subject;
        let message = self.message(recipient, email)?;
        self.transport
            .send(message)
            .await
            .map_err(|err| MailerError::delivery(err.to_string()))?;
        info!(to = %recipient.email, subject, "account email sent");
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_confirmation(
        &self,
        recipient: &Recipient,
        token: &AccountToken,
    ) -> Result<(), MailerError> {
        let link = account_link(&self.base_url, &CONFIRM_PATH, token)?;
        self.deliver(recipient, AccountEmail::confirmation(recipient, &link))
            .await
    }

    async fn send_password_reset(
        &self,
        recipient: &Recipient,
        token: &AccountToken,
    ) -> Result<(), MailerError> {
        let link = account_link(&self.base_url, &RESET_PATH, token)?;
        self.deliver(recipient, AccountEmail::password_reset(recipient, &link))
            .await
    }
}
