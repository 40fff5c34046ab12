//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{AccountToken, Email, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Email address already belongs to another account.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// User lookup and account persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by login email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch the user holding a pending confirmation or reset token.
    async fn find_by_token(
        &self,
        token: &AccountToken,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Store a new account.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Persist changes to an existing account.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Remove an account. Removing an absent account is not an error.
    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError>;
}
