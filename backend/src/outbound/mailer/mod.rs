//! Account email adapters.
//!
//! [`SmtpMailer`] delivers through an SMTP relay. [`LogMailer`] only records
//! that a message would have been sent and is meant for local development.
//! Both render the same [`AccountEmail`] bodies.

mod logging;
mod smtp;

pub use logging::LogMailer;
pub use smtp::{SmtpMailer, SmtpMailerError};

use async_trait::async_trait;
use url::Url;

use crate::domain::AccountToken;
use crate::domain::ports::{Mailer, MailerError, Recipient};

/// Path segments of the confirmation link.
pub const CONFIRM_PATH: [&str; 2] = ["auth", "confirmar"];
/// Path segments of the password reset link.
pub const RESET_PATH: [&str; 2] = ["auth", "olvide-password"];

/// Build `{base}/{segments..}/{token}` with each segment percent-encoded.
///
/// # Examples
/// ```
/// use listings::domain::AccountToken;
/// use listings::outbound::mailer::{CONFIRM_PATH, account_link};
/// use url::Url;
///
/// let base = Url::parse("https://listings.example/app/").expect("valid url");
/// let token = AccountToken::new("abc123").expect("token");
/// let link = account_link(&base, &CONFIRM_PATH, &token).expect("link");
/// assert_eq!(link.as_str(), "https://listings.example/app/auth/confirmar/abc123");
/// ```
pub fn account_link(
    base: &Url,
    segments: &[&str],
    token: &AccountToken,
) -> Result<Url, MailerError> {
    let mut link = base.clone();
    link.path_segments_mut()
        .map_err(|()| MailerError::delivery(format!("base url cannot hold a path: {base}")))?
        .pop_if_empty()
        .extend(segments)
        .push(token.as_ref());
    Ok(link)
}

/// Rendered account email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEmail {
    pub subject: &'static str,
    pub text: String,
    pub html: String,
}

impl AccountEmail {
    /// Message asking a new user to confirm their account.
    pub fn confirmation(recipient: &Recipient, link: &Url) -> Self {
        let name = recipient.display_name.as_ref();
        Self {
            subject: "Confirma tu cuenta",
            text: format!(
                "Hola {name}, tu cuenta ya está lista.\n\
                 Confírmala en el siguiente enlace: {link}\n\
                 Si tú no creaste esta cuenta, puedes ignorar el mensaje."
            ),
            html: format!(
                "<p>Hola {name}, tu cuenta ya está lista.</p>\
                 <p>Confírmala en el siguiente enlace: \
                 <a href=\"{link}\">Confirmar cuenta</a></p>\
                 <p>Si tú no creaste esta cuenta, puedes ignorar el mensaje.</p>"
            ),
        }
    }

    /// Message carrying a password reset link.
    pub fn password_reset(recipient: &Recipient, link: &Url) -> Self {
        let name = recipient.display_name.as_ref();
        Self {
            subject: "Reestablece tu password",
            text: format!(
                "Hola {name}, has solicitado reestablecer tu password.\n\
                 Sigue el siguiente enlace para generar uno nuevo: {link}\n\
                 Si tú no solicitaste el cambio, puedes ignorar el mensaje."
            ),
            html: format!(
                "<p>Hola {name}, has solicitado reestablecer tu password.</p>\
                 <p>Sigue el siguiente enlace para generar uno nuevo: \
                 <a href=\"{link}\">Reestablecer password</a></p>\
                 <p>Si tú no solicitaste el cambio, puedes ignorar el mensaje.</p>"
            ),
        }
    }
}

/// Mailer chosen at startup.
#[derive(Debug, Clone)]
pub enum AccountMailer {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

#[async_trait]
impl Mailer for AccountMailer {
    async fn send_confirmation(
        &self,
        recipient: &Recipient,
        token: &AccountToken,
    ) -> Result<(), MailerError> {
        match self {
            Self::Smtp(mailer) => mailer.send_confirmation(recipient, token).await,
            Self::Log(mailer) => mailer.send_confirmation(recipient, token).await,
        }
    }

    async fn send_password_reset(
        &self,
        recipient: &Recipient,
        token: &AccountToken,
    ) -> Result<(), MailerError> {
        match self {
            Self::Smtp(mailer) => mailer.send_password_reset(recipient, token).await,
            Self::Log(mailer) => mailer.send_password_reset(recipient, token).await,
        }
    }
}
