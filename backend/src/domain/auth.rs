//! Authentication primitives: login credentials, registrations, passwords.
//!
//! Inbound adapters validate raw form fields first; these constructors
//! re-check the invariants the services rely on so the domain never sees an
//! unvalidated password or email.

use zeroize::Zeroizing;

use super::error::{Error, FieldError};
use super::user::{DisplayName, Email, UserValidationError};

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Validation errors for authentication inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthValidationError {
    /// Email or display name failed validation.
    #[error(transparent)]
    User(#[from] UserValidationError),
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password shorter than [`PASSWORD_MIN_LEN`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// Password confirmation did not match.
    #[error("passwords do not match")]
    PasswordMismatch,
}

impl AuthValidationError {
    /// Name of the form field the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::User(UserValidationError::InvalidEmail) => "email",
            Self::User(UserValidationError::InvalidId) => "id",
            Self::User(_) => "display_name",
            Self::EmptyPassword | Self::PasswordTooShort { .. } => "password",
            Self::PasswordMismatch => "repeat_password",
        }
    }
}

impl From<AuthValidationError> for Error {
    fn from(err: AuthValidationError) -> Self {
        Error::invalid_fields(vec![FieldError::new(err.field(), "invalid", err.to_string())])
    }
}

/// Password chosen by a user, zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Validate a new password against the length policy.
    ///
    /// # Examples
    /// ```
    /// use listings::domain::NewPassword;
    ///
    /// assert!(NewPassword::new("hunter22").is_ok());
    /// assert!(NewPassword::new("short").is_err());
    /// ```
    pub fn new(password: &str) -> Result<Self, AuthValidationError> {
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(AuthValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LEN,
            });
        }
        Ok(Self(Zeroizing::new(password.to_owned())))
    }

    /// Plain-text password for the hasher.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NewPassword(..)")
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is normalised.
/// - `password` is non-empty; whitespace is kept as typed.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw form values.
    ///
    /// # Examples
    /// ```
    /// use listings::domain::LoginCredentials;
    ///
    /// let creds = LoginCredentials::try_from_parts("Ada@example.com", "pw").unwrap();
    /// assert_eq!(creds.email().as_ref(), "ada@example.com");
    /// ```
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Raw registration form values.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationInput<'a> {
    /// Requested display name.
    pub display_name: &'a str,
    /// Login email.
    pub email: &'a str,
    /// Chosen password.
    pub password: &'a str,
    /// Password typed a second time.
    pub repeat_password: &'a str,
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    display_name: DisplayName,
    email: Email,
    password: NewPassword,
}

impl Registration {
    /// Validate a registration form.
    pub fn try_new(input: RegistrationInput<'_>) -> Result<Self, AuthValidationError> {
        let display_name = DisplayName::new(input.display_name)?;
        let email = Email::new(input.email)?;
        let password = NewPassword::new(input.password)?;
        if input.password != input.repeat_password {
            return Err(AuthValidationError::PasswordMismatch);
        }
        Ok(Self {
            display_name,
            email,
            password,
        })
    }

    /// Requested display name.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Chosen password.
    pub fn password(&self) -> &NewPassword {
        &self.password
    }
}
