//! Signing key fingerprint for operational visibility.
//!
//! Operators compare the logged fingerprint against the deployed secret
//! without the key material itself ever reaching the logs.

use sha2::{Digest, Sha256};

const FINGERPRINT_BYTES: usize = 8;

/// First eight bytes of the SHA-256 digest of `key`, hex encoded.
///
/// # Examples
///
/// ```rust
/// use listings::inbound::http::credential_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&[7u8; 32]);
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn key_fingerprint(key: &[u8]) -> String {
    let digest = Sha256::digest(key);
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fingerprint_is_stable() {
        assert_eq!(key_fingerprint(&[b'a'; 64]), key_fingerprint(&[b'a'; 64]));
    }

    #[rstest]
    fn different_keys_differ() {
        assert_ne!(key_fingerprint(&[b'a'; 64]), key_fingerprint(&[b'b'; 64]));
    }

    #[rstest]
    fn fingerprint_is_lowercase_hex() {
        let fp = key_fingerprint(b"listings");
        assert_eq!(fp.len(), FINGERPRINT_BYTES * 2);
        assert_eq!(fp, fp.to_lowercase());
    }
}
