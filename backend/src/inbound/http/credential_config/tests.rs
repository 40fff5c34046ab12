//! Unit tests for credential configuration parsing.

use std::collections::HashMap;

use mockable::MockEnv;
use rstest::rstest;
use tempfile::TempDir;

use super::*;

struct KeyFile {
    _dir: TempDir,
    path: PathBuf,
}

impl KeyFile {
    fn new(len: usize) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("credential_key");
        Dir::open_ambient_dir(dir.path(), ambient_authority())
            .expect("open temp dir")
            .write("credential_key", vec![b'k'; len])
            .expect("write key");
        Self { _dir: dir, path }
    }

    fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn release_vars(key: &KeyFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, key.path_str()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

fn release_error(vars: HashMap<&'static str, String>) -> CredentialConfigError {
    match credential_settings_from_env(&mock_env(vars), BuildMode::Release) {
        Ok(_) => panic!("release settings unexpectedly accepted"),
        Err(err) => err,
    }
}

#[rstest]
fn release_accepts_complete_settings() {
    let key = KeyFile::new(KEY_MIN_LEN);
    let settings = credential_settings_from_env(&mock_env(release_vars(&key)), BuildMode::Release)
        .expect("valid settings");

    assert_eq!(settings.signing_key.len(), KEY_MIN_LEN);
    assert_eq!(
        settings.cookie,
        CookiePolicy {
            secure: true,
            same_site: SameSite::Strict
        }
    );
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(#[case] missing: &'static str) {
    let key = KeyFile::new(KEY_MIN_LEN);
    let mut vars = release_vars(&key);
    vars.remove(missing);

    let err = release_error(vars);
    assert!(matches!(err, CredentialConfigError::MissingEnv { name } if name == missing));
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(SAMESITE_ENV, "sometimes")]
fn release_rejects_invalid_values(#[case] name: &'static str, #[case] value: &str) {
    let key = KeyFile::new(KEY_MIN_LEN);
    let mut vars = release_vars(&key);
    vars.insert(name, value.to_owned());

    let err = release_error(vars);
    assert!(matches!(err, CredentialConfigError::InvalidEnv { name: n, .. } if n == name));
}

#[rstest]
fn release_rejects_short_key() {
    let key = KeyFile::new(KEY_MIN_LEN - 1);
    let err = release_error(release_vars(&key));
    assert!(matches!(err, CredentialConfigError::KeyTooShort { .. }));
}

#[rstest]
fn release_rejects_missing_key_file() {
    let key = KeyFile::new(KEY_MIN_LEN);
    let mut vars = release_vars(&key);
    vars.insert(KEY_FILE_ENV, "/nonexistent/listings/key".to_owned());

    let err = release_error(vars);
    assert!(matches!(err, CredentialConfigError::KeyRead { .. }));
}

#[rstest]
fn release_rejects_ephemeral_keys() {
    let key = KeyFile::new(KEY_MIN_LEN);
    let mut vars = release_vars(&key);
    vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());

    let err = release_error(vars);
    assert!(matches!(err, CredentialConfigError::EphemeralNotAllowed));
}

#[rstest]
#[case("0")]
#[case("1")]
fn release_rejects_same_site_none(#[case] secure: &str) {
    let key = KeyFile::new(KEY_MIN_LEN);
    let mut vars = release_vars(&key);
    vars.insert(COOKIE_SECURE_ENV, secure.to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());

    let err = release_error(vars);
    assert!(matches!(err, CredentialConfigError::SameSiteNone));
}

#[rstest]
fn debug_replaces_same_site_none_with_lax() {
    let vars = HashMap::from([(SAMESITE_ENV, "none".to_owned())]);
    let settings =
        credential_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug settings");
    assert_eq!(settings.cookie.same_site, SameSite::Lax);
}

#[rstest]
fn debug_falls_back_to_defaults_and_ephemeral_key() {
    let vars = HashMap::from([
        (KEY_FILE_ENV, "/nonexistent/listings/key".to_owned()),
        (COOKIE_SECURE_ENV, "bogus".to_owned()),
    ]);
    let settings = credential_settings_from_env(&mock_env(vars), BuildMode::Debug)
        .expect("debug tolerates bad toggles");

    assert!(settings.cookie.secure);
    assert_eq!(settings.cookie.same_site, SameSite::Lax);
    assert_eq!(settings.signing_key.len(), EPHEMERAL_KEY_LEN);
}

#[rstest]
fn debug_accepts_short_key_file() {
    let key = KeyFile::new(4);
    let vars = HashMap::from([(KEY_FILE_ENV, key.path_str())]);
    let settings =
        credential_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug settings");
    assert_eq!(settings.signing_key.len(), 4);
}
