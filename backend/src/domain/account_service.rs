//! Account use-cases: sign-in, registration, confirmation and password reset.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use tracing::{error, info, warn};

use crate::domain::credential_verifier::map_user_error;
use crate::domain::ports::{
    AccountOperations, CredentialSigner, CredentialSignerError, Mailer, MailerError,
    PasswordHasher, PasswordHasherError, Recipient, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccountToken, Credential, CredentialClaims, Email, Error, LoginCredentials, NewPassword,
    Registration, User, UserDraft, UserId,
};

/// Length of generated confirmation and reset tokens.
pub const ACCOUNT_TOKEN_LEN: usize = 32;

const INVALID_LOGIN: &str = "invalid email or password";

/// Collaborators of [`AccountService`].
pub struct AccountCollaborators<U, H, S, M> {
    /// Account storage.
    pub users: Arc<U>,
    /// Password hashing.
    pub hasher: Arc<H>,
    /// Credential signing.
    pub signer: Arc<S>,
    /// Outgoing mail.
    pub mailer: Arc<M>,
}

/// Account service implementing [`AccountOperations`].
#[derive(Clone)]
pub struct AccountService<U, H, S, M> {
    users: Arc<U>,
    hasher: Arc<H>,
    signer: Arc<S>,
    mailer: Arc<M>,
    clock: Arc<dyn Clock>,
    credential_ttl: Duration,
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

fn map_signer_error(error: CredentialSignerError) -> Error {
    Error::internal(error.to_string())
}

fn map_mailer_error(error: MailerError) -> Error {
    match error {
        MailerError::Delivery { message } => {
            Error::service_unavailable(format!("mail delivery unavailable: {message}"))
        }
    }
}

fn generate_token() -> Result<AccountToken, Error> {
    let raw: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ACCOUNT_TOKEN_LEN)
        .map(char::from)
        .collect();
    AccountToken::new(raw).ok_or_else(|| Error::internal("generated account token was blank"))
}

fn recipient(user: &User) -> Recipient {
    Recipient {
        email: user.email().clone(),
        display_name: user.display_name().clone(),
    }
}

impl<U, H, S, M> AccountService<U, H, S, M>
where
    U: UserRepository,
    H: PasswordHasher,
    S: CredentialSigner,
    M: Mailer,
{
    /// Create a service issuing credentials valid for `credential_ttl`.
    pub fn new(
        collaborators: AccountCollaborators<U, H, S, M>,
        clock: Arc<dyn Clock>,
        credential_ttl: Duration,
    ) -> Self {
        let AccountCollaborators {
            users,
            hasher,
            signer,
            mailer,
        } = collaborators;
        Self {
            users,
            hasher,
            signer,
            mailer,
            clock,
            credential_ttl,
        }
    }

    async fn user_with_token(&self, token: &str) -> Result<User, Error> {
        let invalid = || Error::invalid_request("token is invalid or has expired");
        let token = AccountToken::new(token.trim()).ok_or_else(invalid)?;
        self.users
            .find_by_token(&token)
            .await
            .map_err(map_user_error)?
            .ok_or_else(invalid)
    }

    async fn update(&self, user: &User) -> Result<(), Error> {
        self.users.update(user).await.map_err(map_user_error)
    }
}

#[async_trait]
impl<U, H, S, M> AccountOperations for AccountService<U, H, S, M>
where
    U: UserRepository,
    H: PasswordHasher,
    S: CredentialSigner,
    M: Mailer,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<Credential, Error> {
        let Some(user) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            warn!("login attempt for unknown email");
            return Err(Error::unauthorized(INVALID_LOGIN));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await
            .map_err(map_hasher_error)?;
        if !matches {
            warn!(user_id = %user.id(), "login attempt with wrong password");
            return Err(Error::unauthorized(INVALID_LOGIN));
        }
        if !user.is_confirmed() {
            return Err(Error::forbidden("account has not been confirmed"));
        }

        let issued_at = self.clock.utc();
        let claims = CredentialClaims {
            subject: *user.id(),
            display_name: user.display_name().clone(),
            issued_at,
            expires_at: issued_at + self.credential_ttl,
        };
        let credential = self.signer.sign(&claims).await.map_err(map_signer_error)?;
        info!(user_id = %user.id(), "user signed in");
        Ok(credential)
    }

    async fn register(&self, registration: &Registration) -> Result<(), Error> {
        if self
            .users
            .find_by_email(registration.email())
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(Error::invalid_request("user already registered"));
        }

        let password_hash = self
            .hasher
            .hash(registration.password().expose())
            .await
            .map_err(map_hasher_error)?;
        let token = generate_token()?;
        let user = User::from(UserDraft {
            id: UserId::random(),
            display_name: registration.display_name().clone(),
            email: registration.email().clone(),
            password_hash,
            token: Some(token.clone()),
            confirmed: false,
        });

        match self.users.insert(&user).await {
            Ok(()) => {}
            Err(UserPersistenceError::DuplicateEmail { .. }) => {
                return Err(Error::invalid_request("user already registered"));
            }
            Err(err) => return Err(map_user_error(err)),
        }
        if let Err(err) = self.mailer.send_confirmation(&recipient(&user), &token).await {
            // Without the mail the account could never be confirmed.
            if let Err(cleanup) = self.users.delete(user.id()).await {
                error!(user_id = %user.id(), error = %cleanup, "unconfirmable account left behind");
            }
            return Err(map_mailer_error(err));
        }
        info!(user_id = %user.id(), "account registered");
        Ok(())
    }

    async fn confirm(&self, token: &str) -> Result<(), Error> {
        let mut user = self.user_with_token(token).await?;
        user.confirm();
        self.update(&user).await?;
        info!(user_id = %user.id(), "account confirmed");
        Ok(())
    }

    async fn request_password_reset(&self, email: &Email) -> Result<(), Error> {
        let Some(mut user) = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?
        else {
            return Ok(());
        };

        let token = generate_token()?;
        user.issue_token(token.clone());
        self.update(&user).await?;
        // The reply must not reveal whether the address is registered.
        if let Err(err) = self.mailer.send_password_reset(&recipient(&user), &token).await {
            error!(user_id = %user.id(), error = %err, "password reset email not sent");
            return Ok(());
        }
        info!(user_id = %user.id(), "password reset requested");
        Ok(())
    }

    async fn check_reset_token(&self, token: &str) -> Result<(), Error> {
        self.user_with_token(token).await.map(|_| ())
    }

    async fn reset_password(&self, token: &str, password: &NewPassword) -> Result<(), Error> {
        let mut user = self.user_with_token(token).await?;
        let hash = self
            .hasher
            .hash(password.expose())
            .await
            .map_err(map_hasher_error)?;
        user.reset_password(hash);
        self.update(&user).await?;
        info!(user_id = %user.id(), "password changed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
