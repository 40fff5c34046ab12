//! Builders wiring adapters into services and services into HTTP state.

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use url::Url;

use crate::domain::ports::{
    CatalogueRepository, CredentialSigner, FixtureCatalogueRepository, ImageStore, Mailer,
    MessageRepository, PasswordHasher, PropertyRepository, UserRepository,
};
use crate::domain::{
    AccountCollaborators, AccountService, CredentialVerifier, ListingRepositories, ListingService,
};
use crate::inbound::http::cookies::CredentialCookies;
use crate::inbound::http::credential_config::CredentialSettings;
use crate::inbound::http::credential_config::fingerprint::key_fingerprint;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::argon2_hasher::Argon2PasswordHasher;
use crate::outbound::images::CapStdImageStore;
use crate::outbound::jwt::{DEFAULT_ISSUER, JwtCredentialSigner};
use crate::inbound::http::credential_config::BuildMode;
use crate::outbound::mailer::{AccountMailer, LogMailer, SmtpMailer, SmtpMailerError};
use crate::outbound::memory::{
    InMemoryMessageRepository, InMemoryPropertyRepository, InMemoryUserRepository,
};
use crate::outbound::persistence::{
    DbPool, DieselCatalogueRepository, DieselMessageRepository, DieselPropertyRepository,
    DieselUserRepository, MigrationError, PoolConfig, PoolError, run_pending_migrations,
};

use super::ServerSettings;

/// Errors raised while assembling the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The base URL for emailed links is not a valid URL.
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    /// The uploads directory could not be opened.
    #[error("failed to open uploads directory {path}: {source}")]
    Uploads {
        /// Directory that was requested.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Migrations failed.
    #[error(transparent)]
    Migrations(#[from] MigrationError),
    /// The connection pool could not be built.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// The SMTP relay or sender is misconfigured.
    #[error(transparent)]
    Mailer(#[from] SmtpMailerError),
    /// Release builds refuse to start without a way to deliver account mail.
    #[error("no SMTP relay configured; set LISTINGS_SMTP_URL")]
    MissingSmtpRelay,
}

/// Storage adapters for the four repositories.
pub struct Repositories<U, P, M, C> {
    /// Accounts.
    pub users: Arc<U>,
    /// Listings.
    pub properties: Arc<P>,
    /// Buyer messages.
    pub messages: Arc<M>,
    /// Category and price lookup tables.
    pub catalogue: Arc<C>,
}

/// Non-storage collaborators shared by the services.
pub struct Collaborators<S, H, I, Ml> {
    /// Signs and verifies credentials.
    pub signer: Arc<S>,
    /// Password hashing.
    pub hasher: Arc<H>,
    /// Listing image storage.
    pub images: Arc<I>,
    /// Account emails.
    pub mailer: Arc<Ml>,
    /// Time source for credential and listing timestamps.
    pub clock: Arc<dyn Clock>,
    /// Lifetime of issued credentials.
    pub credential_ttl: chrono::Duration,
}

/// Wire services over the given adapters.
pub fn http_state_ports<U, P, M, C, S, H, I, Ml>(
    repositories: Repositories<U, P, M, C>,
    collaborators: Collaborators<S, H, I, Ml>,
) -> HttpStatePorts
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    M: MessageRepository + 'static,
    C: CatalogueRepository + 'static,
    S: CredentialSigner + 'static,
    H: PasswordHasher + 'static,
    I: ImageStore + 'static,
    Ml: Mailer + 'static,
{
    let Repositories {
        users,
        properties,
        messages,
        catalogue,
    } = repositories;
    let Collaborators {
        signer,
        hasher,
        images,
        mailer,
        clock,
        credential_ttl,
    } = collaborators;

    let verifier = CredentialVerifier::new(Arc::clone(&signer), Arc::clone(&users));
    let accounts = AccountService::new(
        AccountCollaborators {
            users: Arc::clone(&users),
            hasher,
            signer,
            mailer,
        },
        Arc::clone(&clock),
        credential_ttl,
    );
    let listings = ListingService::new(
        ListingRepositories {
            properties,
            messages,
            catalogue,
            images,
            users,
        },
        clock,
    );
    HttpStatePorts {
        verifier: Arc::new(verifier),
        listings: Arc::new(listings),
        accounts: Arc::new(accounts),
    }
}

/// Deliver over SMTP when a relay is configured. Debug builds fall back to
/// logging the messages.
pub fn account_mailer(
    settings: &ServerSettings,
    base_url: Url,
    mode: BuildMode,
) -> Result<AccountMailer, StartupError> {
    match settings.smtp_url() {
        Some(relay) => Ok(AccountMailer::Smtp(SmtpMailer::new(
            relay,
            settings.mail_from(),
            base_url,
        )?)),
        None if mode == BuildMode::Debug => {
            warn!("no SMTP relay configured; account emails are logged, not sent");
            Ok(AccountMailer::Log(LogMailer::new(base_url)))
        }
        None => Err(StartupError::MissingSmtpRelay),
    }
}

fn cookies(settings: &ServerSettings, credentials: &CredentialSettings) -> CredentialCookies {
    let max_age = actix_web::cookie::time::Duration::seconds(settings.credential_ttl().num_seconds());
    CredentialCookies::new(credentials.cookie, max_age)
}

/// Build the production HTTP state: Diesel repositories when a database URL
/// is configured, in-memory ones otherwise.
pub async fn build_http_state(
    settings: &ServerSettings,
    credentials: &CredentialSettings,
) -> Result<web::Data<HttpState>, StartupError> {
    let uploads = settings.uploads_dir();
    let images = CapStdImageStore::open(uploads).map_err(|source| StartupError::Uploads {
        path: uploads.to_path_buf(),
        source,
    })?;
    let base_url = settings.base_url()?;
    info!(
        fingerprint = %key_fingerprint(&credentials.signing_key),
        "credential signing key loaded"
    );
    let collaborators = Collaborators {
        signer: Arc::new(JwtCredentialSigner::new(&credentials.signing_key, DEFAULT_ISSUER)),
        hasher: Arc::new(Argon2PasswordHasher::new()),
        images: Arc::new(images),
        mailer: Arc::new(account_mailer(
            settings,
            base_url,
            BuildMode::from_debug_assertions(),
        )?),
        clock: Arc::new(DefaultClock) as Arc<dyn Clock>,
        credential_ttl: settings.credential_ttl(),
    };

    let ports = match settings.database_url() {
        Some(url) => {
            run_pending_migrations(url).await?;
            let pool = DbPool::new(PoolConfig::new(url)).await?;
            info!("using PostgreSQL storage");
            http_state_ports(
                Repositories {
                    users: Arc::new(DieselUserRepository::new(pool.clone())),
                    properties: Arc::new(DieselPropertyRepository::new(pool.clone())),
                    messages: Arc::new(DieselMessageRepository::new(pool.clone())),
                    catalogue: Arc::new(DieselCatalogueRepository::new(pool)),
                },
                collaborators,
            )
        }
        None => {
            warn!("no database URL configured; data is kept in memory and lost on restart");
            http_state_ports(
                Repositories {
                    users: Arc::new(InMemoryUserRepository::new()),
                    properties: Arc::new(InMemoryPropertyRepository::new()),
                    messages: Arc::new(InMemoryMessageRepository::new()),
                    catalogue: Arc::new(FixtureCatalogueRepository),
                },
                collaborators,
            )
        }
    };

    Ok(web::Data::new(HttpState::new(
        ports,
        cookies(settings, credentials),
    )))
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::SameSite;
    use rstest::rstest;
    use zeroize::Zeroizing;

    use super::*;
    use crate::inbound::http::credential_config::CookiePolicy;

    fn credentials() -> CredentialSettings {
        CredentialSettings {
            signing_key: Zeroizing::new(vec![7; 32]),
            cookie: CookiePolicy {
                secure: true,
                same_site: SameSite::Strict,
            },
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn in_memory_state_builds_without_database() {
        let uploads = tempfile::tempdir().expect("temp dir");
        let settings = ServerSettings {
            uploads_dir: Some(uploads.path().join("images")),
            ..ServerSettings::default()
        };

        let state = build_http_state(&settings, &credentials())
            .await
            .expect("state builds");
        let catalogue = state.listings.catalogue().await.expect("fixture catalogue");
        assert!(!catalogue.categories.is_empty());
        assert!(uploads.path().join("images").is_dir());
    }

    #[rstest]
    #[actix_web::test]
    async fn invalid_base_url_is_reported() {
        let uploads = tempfile::tempdir().expect("temp dir");
        let settings = ServerSettings {
            uploads_dir: Some(uploads.path().to_path_buf()),
            base_url: Some("not a url".to_owned()),
            ..ServerSettings::default()
        };

        let err = build_http_state(&settings, &credentials())
            .await
            .err()
            .expect("invalid url");
        assert!(matches!(err, StartupError::BaseUrl(_)));
    }

    #[rstest]
    #[case(None, BuildMode::Debug, Some(false))]
    #[case(None, BuildMode::Release, None)]
    #[case(Some("smtp://relay.example:2525"), BuildMode::Release, Some(true))]
    #[tokio::test]
    async fn mailer_follows_relay_and_build_mode(
        #[case] relay: Option<&str>,
        #[case] mode: BuildMode,
        #[case] expect_smtp: Option<bool>,
    ) {
        let settings = ServerSettings {
            smtp_url: relay.map(str::to_owned),
            ..ServerSettings::default()
        };
        let base = Url::parse("https://casas.example").expect("url");

        let outcome = account_mailer(&settings, base, mode)
            .ok()
            .map(|mailer| matches!(mailer, AccountMailer::Smtp(_)));
        assert_eq!(outcome, expect_smtp);
    }

    #[rstest]
    fn cookie_lifetime_follows_credential_ttl() {
        let settings = ServerSettings {
            credential_ttl_hours: 2,
            ..ServerSettings::default()
        };
        let credential = crate::domain::Credential::new("signed").expect("non-blank");
        let cookie = cookies(&settings, &credentials()).issue(&credential);
        assert_eq!(cookie.max_age(), Some(actix_web::cookie::time::Duration::hours(2)));
        assert_eq!(cookie.secure(), Some(true));
    }
}
