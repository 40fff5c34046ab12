//! User accounts and the caller identity derived from them.
//!
//! A [`User`] carries the sensitive account state (password hash, one-shot
//! token, confirmation flag). Everything that leaves the account flows is a
//! [`CallerIdentity`], which only exposes the id and display name.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidateEmail;

/// Validation errors raised by the user value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The display name was blank.
    #[error("display name must not be empty")]
    EmptyDisplayName,
    /// The display name exceeded [`DISPLAY_NAME_MAX`].
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The display name contained characters outside letters, digits, and
    /// simple punctuation.
    #[error("display name may only contain letters, numbers, spaces, dots, dashes, or apostrophes")]
    DisplayNameInvalidCharacters,
    /// The email address was malformed.
    #[error("email address is not valid")]
    InvalidEmail,
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its string form.
    ///
    /// # Examples
    /// ```
    /// use listings::domain::UserId;
    ///
    /// assert!(UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").is_ok());
    /// assert!(UserId::new(" 3fa85f64-5717-4562-b3fc-2c963f66afa6").is_err());
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 60;

static DISPLAY_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn display_name_regex() -> &'static Regex {
    DISPLAY_NAME_RE.get_or_init(|| {
        // Length is enforced separately.
        Regex::new(r"^[\p{L}\p{N} .'_-]+$")
            .unwrap_or_else(|error| panic!("display name regex failed to compile: {error}"))
    })
}

/// Human readable name shown to other users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Ada Lovelace")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`]; surrounding whitespace is
    /// trimmed.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = display_name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        if !display_name_regex().is_match(trimmed) {
            return Err(UserValidationError::DisplayNameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Normalised (trimmed, lowercase) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use listings::domain::Email;
    ///
    /// let email = Email::new(" Ada@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_ref(), "ada@example.com");
    /// assert!(Email::new("not-an-email").is_err());
    /// ```
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = email.as_ref().trim().to_lowercase();
        if !normalised.as_str().validate_email() {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// One-shot token used by the confirmation and password reset links.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountToken(String);

impl AccountToken {
    /// Wrap a raw token value. Blank values are rejected.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }
}

impl AsRef<str> for AccountToken {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Opaque PHC-formatted password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a password hasher adapter.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Authenticated actor making a request.
///
/// Reconstructed from a verified credential on every request and never
/// persisted. Carries no sensitive account state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    id: UserId,
    display_name: DisplayName,
}

impl CallerIdentity {
    /// Build an identity from validated components.
    #[must_use]
    pub fn new(id: UserId, display_name: DisplayName) -> Self {
        Self { id, display_name }
    }

    /// Identifier of the caller.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name of the caller.
    #[must_use]
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }
}

/// Field values used to build or rehydrate a [`User`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    /// Account identifier.
    pub id: UserId,
    /// Public name.
    pub display_name: DisplayName,
    /// Login email.
    pub email: Email,
    /// Stored password hash.
    pub password_hash: PasswordHash,
    /// Pending confirmation or reset token.
    pub token: Option<AccountToken>,
    /// Whether the email address was confirmed.
    pub confirmed: bool,
}

/// Registered account including its sensitive fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    display_name: DisplayName,
    email: Email,
    password_hash: PasswordHash,
    token: Option<AccountToken>,
    confirmed: bool,
}

impl From<UserDraft> for User {
    fn from(draft: UserDraft) -> Self {
        let UserDraft {
            id,
            display_name,
            email,
            password_hash,
            token,
            confirmed,
        } = draft;
        Self {
            id,
            display_name,
            email,
            password_hash,
            token,
            confirmed,
        }
    }
}

impl User {
    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name shown to other users.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Stored password hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Pending one-shot token, if any.
    pub fn token(&self) -> Option<&AccountToken> {
        self.token.as_ref()
    }

    /// Whether the account has been confirmed.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Project the account onto its public identity.
    pub fn identity(&self) -> CallerIdentity {
        CallerIdentity::new(self.id, self.display_name.clone())
    }

    /// Mark the account confirmed and consume the pending token.
    pub fn confirm(&mut self) {
        self.confirmed = true;
        self.token = None;
    }

    /// Replace the pending token.
    pub fn issue_token(&mut self, token: AccountToken) {
        self.token = Some(token);
    }

    /// Store a new password hash and consume the pending token.
    pub fn reset_password(&mut self, password_hash: PasswordHash) {
        self.password_hash = password_hash;
        self.token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn user() -> User {
        User::from(UserDraft {
            id: UserId::random(),
            display_name: DisplayName::new("Ada Lovelace").expect("valid name"),
            email: Email::new("ada@example.com").expect("valid email"),
            password_hash: PasswordHash::new("$argon2id$stub"),
            token: AccountToken::new("confirm-me"),
            confirmed: false,
        })
    }

    #[rstest]
    #[case("José Pérez")]
    #[case("O'Neil-Smith Jr.")]
    #[case("  padded  ")]
    fn accepts_realistic_display_names(#[case] raw: &str) {
        let name = DisplayName::new(raw).expect("valid display name");
        assert_eq!(name.as_ref(), raw.trim());
    }

    #[rstest]
    #[case("", UserValidationError::EmptyDisplayName)]
    #[case("   ", UserValidationError::EmptyDisplayName)]
    #[case("bad$char", UserValidationError::DisplayNameInvalidCharacters)]
    fn rejects_invalid_display_names(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(DisplayName::new(raw), Err(expected));
    }

    #[rstest]
    fn rejects_overlong_display_names() {
        let raw = "a".repeat(DISPLAY_NAME_MAX + 1);
        assert_eq!(
            DisplayName::new(raw),
            Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX
            })
        );
    }

    #[rstest]
    #[case("")]
    #[case("nobody")]
    #[case("two@@example.com")]
    fn rejects_invalid_emails(#[case] raw: &str) {
        assert_eq!(Email::new(raw), Err(UserValidationError::InvalidEmail));
    }

    #[rstest]
    fn user_id_round_trips_through_json() {
        let id = UserId::random();
        let json = serde_json::to_string(&id).expect("serialise id");
        let back: UserId = serde_json::from_str(&json).expect("deserialise id");
        assert_eq!(back, id);
    }

    #[rstest]
    fn identity_excludes_sensitive_fields(user: User) {
        let value = serde_json::to_value(user.identity()).expect("serialise identity");
        let object = value.as_object().expect("identity serialises as object");
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["displayName", "id"]);
    }

    #[rstest]
    fn confirm_consumes_token(mut user: User) {
        user.confirm();
        assert!(user.is_confirmed());
        assert!(user.token().is_none());
    }

    #[rstest]
    fn reset_password_replaces_hash_and_consumes_token(mut user: User) {
        user.reset_password(PasswordHash::new("$argon2id$new"));
        assert_eq!(user.password_hash().as_ref(), "$argon2id$new");
        assert!(user.token().is_none());
    }

    #[rstest]
    fn password_hash_debug_is_redacted() {
        let hash = PasswordHash::new("$argon2id$secret");
        assert_eq!(format!("{hash:?}"), "PasswordHash(..)");
    }
}
