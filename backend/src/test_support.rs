//! Test utilities shared by unit tests (in `src/`) and integration tests (in
//! `tests/`).
//!
//! [`TestApp`] wires the real services and HTTP gate over in-memory storage,
//! a recording mailer and a cheap password hasher.

use std::sync::{Arc, Mutex, PoisonError};

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::web;
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::domain::PasswordHash;
use crate::domain::ports::{
    FixtureCatalogueRepository, Mailer, MailerError, PasswordHasher, PasswordHasherError,
    Recipient,
};
use crate::domain::AccountToken;
use crate::inbound::http::cookies::CredentialCookies;
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::HttpState;
use crate::outbound::jwt::{DEFAULT_ISSUER, JwtCredentialSigner};
use crate::outbound::memory::{
    InMemoryImageStore, InMemoryMessageRepository, InMemoryPropertyRepository,
    InMemoryUserRepository,
};
use crate::server::{AppDependencies, Collaborators, Repositories, http_state_ports};

/// Signing key used by [`TestApp`].
pub const TEST_SIGNING_KEY: &[u8] = b"test-signing-key-with-enough-bytes";

/// Which account email was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    /// Account confirmation link.
    Confirmation,
    /// Password reset link.
    PasswordReset,
}

/// One email captured by [`RecordingMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    /// Kind of email.
    pub kind: MailKind,
    /// Recipient address.
    pub email: String,
    /// Token carried in the link.
    pub token: String,
}

/// Mailer that keeps every email in memory.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    /// Token of the most recent email of `kind` sent to `email`.
    pub fn last_token(&self, kind: MailKind, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|mail| mail.kind == kind && mail.email == email)
            .map(|mail| mail.token.clone())
    }

    /// Number of emails sent so far.
    pub fn count(&self) -> usize {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn record(&self, kind: MailKind, recipient: &Recipient, token: &AccountToken) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentMail {
                kind,
                email: recipient.email.as_ref().to_owned(),
                token: token.as_ref().to_owned(),
            });
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_confirmation(
        &self,
        recipient: &Recipient,
        token: &AccountToken,
    ) -> Result<(), MailerError> {
        self.record(MailKind::Confirmation, recipient, token);
        Ok(())
    }

    async fn send_password_reset(
        &self,
        recipient: &Recipient,
        token: &AccountToken,
    ) -> Result<(), MailerError> {
        self.record(MailKind::PasswordReset, recipient, token);
        Ok(())
    }
}

/// Reversible "hasher" that keeps tests fast. Never use outside tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainPasswordHasher;

const PLAIN_PREFIX: &str = "plain$";

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        Ok(PasswordHash::new(format!("{PLAIN_PREFIX}{password}")))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        Ok(hash.as_ref().strip_prefix(PLAIN_PREFIX) == Some(password))
    }
}

/// Real services over in-memory adapters.
pub struct TestApp {
    /// State handed to the handlers.
    pub state: web::Data<HttpState>,
    /// Captured account emails.
    pub mailer: Arc<RecordingMailer>,
    /// Stored images.
    pub images: Arc<InMemoryImageStore>,
}

impl TestApp {
    /// Build the services with credentials valid for one hour.
    pub fn new() -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let images = Arc::new(InMemoryImageStore::new());
        let ports = http_state_ports(
            Repositories {
                users: Arc::new(InMemoryUserRepository::new()),
                properties: Arc::new(InMemoryPropertyRepository::new()),
                messages: Arc::new(InMemoryMessageRepository::new()),
                catalogue: Arc::new(FixtureCatalogueRepository),
            },
            Collaborators {
                signer: Arc::new(JwtCredentialSigner::new(TEST_SIGNING_KEY, DEFAULT_ISSUER)),
                hasher: Arc::new(PlainPasswordHasher),
                images: Arc::clone(&images),
                mailer: Arc::clone(&mailer),
                clock: Arc::new(DefaultClock) as Arc<dyn Clock>,
                credential_ttl: chrono::Duration::hours(1),
            },
        );
        let cookies = CredentialCookies::insecure(CookieDuration::hours(1));
        Self {
            state: web::Data::new(HttpState::new(ports, cookies)),
            mailer,
            images,
        }
    }

    /// Dependencies for [`crate::server::build_app`].
    pub fn dependencies(&self) -> AppDependencies {
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: self.state.clone(),
            max_upload_bytes: 64 * 1024,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::{DisplayName, Email};

    fn recipient(email: &str) -> Recipient {
        Recipient {
            email: Email::new(email).expect("valid email"),
            display_name: DisplayName::new("Ada").expect("valid name"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn recording_mailer_returns_latest_token_per_kind() {
        let mailer = RecordingMailer::default();
        let ada = recipient("ada@example.com");
        let token = |raw: &str| AccountToken::new(raw).expect("token");

        mailer.send_confirmation(&ada, &token("first")).await.expect("sent");
        mailer.send_password_reset(&ada, &token("reset")).await.expect("sent");
        mailer.send_confirmation(&ada, &token("second")).await.expect("sent");

        assert_eq!(mailer.count(), 3);
        assert_eq!(
            mailer.last_token(MailKind::Confirmation, "ada@example.com"),
            Some("second".to_owned())
        );
        assert_eq!(
            mailer.last_token(MailKind::PasswordReset, "ada@example.com"),
            Some("reset".to_owned())
        );
        assert!(mailer.last_token(MailKind::Confirmation, "grace@example.com").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn plain_hasher_verifies_only_the_original_password() {
        let hash = PlainPasswordHasher.hash("secret1").await.expect("hashed");
        assert!(PlainPasswordHasher.verify("secret1", &hash).await.expect("checked"));
        assert!(!PlainPasswordHasher.verify("secret2", &hash).await.expect("checked"));
    }
}
