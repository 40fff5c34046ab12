//! Credential cookie and signing-key configuration.
//!
//! Settings come from environment variables so they can be validated in
//! isolation. Release builds require every toggle to be present and valid;
//! debug builds log a warning and fall back to a default instead.

pub mod fingerprint;

use std::path::{Path, PathBuf};

use actix_web::cookie::SameSite;
use cap_std::{ambient_authority, fs::Dir};
use mockable::Env;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::warn;
use zeroize::Zeroizing;

pub(crate) const KEY_FILE_ENV: &str = "LISTINGS_CREDENTIAL_KEY_FILE";
pub(crate) const COOKIE_SECURE_ENV: &str = "LISTINGS_COOKIE_SECURE";
pub(crate) const SAMESITE_ENV: &str = "LISTINGS_COOKIE_SAMESITE";
pub(crate) const ALLOW_EPHEMERAL_ENV: &str = "LISTINGS_ALLOW_EPHEMERAL_KEY";

const KEY_DEFAULT_PATH: &str = "/var/run/secrets/credential_key";
/// Minimum signing key length accepted in release builds.
pub const KEY_MIN_LEN: usize = 32;
const EPHEMERAL_KEY_LEN: usize = 64;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax";

/// Build mode deciding how strictly settings are validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Tolerate missing or invalid toggles with a warning.
    Debug,
    /// Reject missing or invalid toggles.
    Release,
}

impl BuildMode {
    /// Mode matching `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Attributes applied to the credential cookie.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Whether the cookie is marked `Secure`.
    pub secure: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
}

/// Validated credential settings.
pub struct CredentialSettings {
    /// Secret used to sign credentials. Wiped on drop.
    pub signing_key: Zeroizing<Vec<u8>>,
    /// Cookie attributes.
    pub cookie: CookiePolicy,
}

/// Errors raised while validating credential settings.
#[derive(thiserror::Error, Debug)]
pub enum CredentialConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable holds an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The key file could not be read.
    #[error("failed to read credential key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is shorter than [`KEY_MIN_LEN`].
    #[error("credential key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` would attach the credential to cross-site requests.
    #[error("LISTINGS_COOKIE_SAMESITE=None is not supported; use Lax or Strict")]
    SameSiteNone,
    /// Ephemeral keys requested in a release build.
    #[error("LISTINGS_ALLOW_EPHEMERAL_KEY must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Read and validate credential settings.
///
/// # Examples
///
/// ```rust
/// use listings::inbound::http::credential_config::{BuildMode, credential_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let settings = credential_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookie.secure);
/// assert!(!settings.signing_key.is_empty());
/// ```
pub fn credential_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<CredentialSettings, CredentialConfigError> {
    let secure = flag_from_env(env, mode, COOKIE_SECURE_ENV, true)?;
    let same_site = same_site_from_env(env, mode)?;
    let allow_ephemeral = flag_from_env(env, mode, ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(CredentialConfigError::EphemeralNotAllowed);
    }
    let signing_key = signing_key_from_env(env, mode, allow_ephemeral)?;

    Ok(CredentialSettings {
        signing_key,
        cookie: CookiePolicy { secure, same_site },
    })
}

fn flag_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    default: bool,
) -> Result<bool, CredentialConfigError> {
    let Some(value) = env.string(name) else {
        if mode.is_debug() {
            warn!(name, default, "credential toggle not set; using default");
            return Ok(default);
        }
        return Err(CredentialConfigError::MissingEnv { name });
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!(name, value = %value, default, "invalid credential toggle; using default");
            Ok(default)
        }
        None => Err(CredentialConfigError::InvalidEnv {
            name,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn same_site_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<SameSite, CredentialConfigError> {
    let default = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = env.string(SAMESITE_ENV) else {
        if mode.is_debug() {
            warn!("{SAMESITE_ENV} not set; using default");
            return Ok(default);
        }
        return Err(CredentialConfigError::MissingEnv { name: SAMESITE_ENV });
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if mode.is_debug() => {
            warn!("SameSite=None is not supported for the credential cookie; using default");
            Ok(default)
        }
        "none" => Err(CredentialConfigError::SameSiteNone),
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid {SAMESITE_ENV}; using default");
            Ok(default)
        }
        _ => Err(CredentialConfigError::InvalidEnv {
            name: SAMESITE_ENV,
            value,
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn read_key(path: &Path) -> std::io::Result<Zeroizing<Vec<u8>>> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "key path has no file name")
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read(file_name).map(Zeroizing::new)
}

fn ephemeral_key() -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(vec![0u8; EPHEMERAL_KEY_LEN]);
    OsRng.fill_bytes(&mut key);
    key
}

fn signing_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Zeroizing<Vec<u8>>, CredentialConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| KEY_DEFAULT_PATH.to_owned()),
    );

    match read_key(&path) {
        Ok(key) if key.len() < KEY_MIN_LEN && !mode.is_debug() => {
            Err(CredentialConfigError::KeyTooShort {
                length: key.len(),
                path,
                min_len: KEY_MIN_LEN,
            })
        }
        Ok(key) => Ok(key),
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary credential key (dev only)"
            );
            Ok(ephemeral_key())
        }
        Err(source) => Err(CredentialConfigError::KeyRead { path, source }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
