//! In-memory `UserRepository`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{AccountToken, Email, User, UserId};

use super::poisoned;

/// Accounts kept in a map keyed by user id.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_users<T>(
        &self,
        f: impl FnOnce(&mut HashMap<UserId, User>) -> Result<T, UserPersistenceError>,
    ) -> Result<T, UserPersistenceError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| poisoned(UserPersistenceError::query))?;
        f(&mut users)
    }
}

fn same_email(user: &User, email: &Email) -> bool {
    user.email() == email
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.with_users(|users| Ok(users.get(id).cloned()))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        self.with_users(|users| {
            Ok(users
                .values()
                .find(|user| same_email(user, email))
                .cloned())
        })
    }

    async fn find_by_token(
        &self,
        token: &AccountToken,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.with_users(|users| {
            Ok(users
                .values()
                .find(|user| user.token() == Some(token))
                .cloned())
        })
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.with_users(|users| {
            if users.values().any(|existing| same_email(existing, user.email())) {
                return Err(UserPersistenceError::duplicate_email(user.email().to_string()));
            }
            users.insert(*user.id(), user.clone());
            Ok(())
        })
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.with_users(|users| match users.get_mut(user.id()) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(UserPersistenceError::query("record not found")),
        })
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        self.with_users(|users| {
            users.remove(id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::test_helpers::user;

    #[rstest]
    #[tokio::test]
    async fn email_lookup_ignores_case() {
        let repo = InMemoryUserRepository::new();
        let ada = user("Ada", true);
        repo.insert(&ada).await.expect("insert");

        let email = Email::new(ada.email().as_ref().to_uppercase()).expect("valid email");
        let found = repo.find_by_email(&email).await.expect("lookup");
        assert_eq!(found.map(|u| *u.id()), Some(*ada.id()));
    }

    #[rstest]
    #[tokio::test]
    async fn second_account_with_same_email_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&user("Ada", true)).await.expect("first insert");

        let err = repo
            .insert(&user("Ada", false))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, UserPersistenceError::DuplicateEmail { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn updating_unknown_user_fails() {
        let repo = InMemoryUserRepository::new();
        let err = repo.update(&user("Ada", true)).await.expect_err("missing");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}
