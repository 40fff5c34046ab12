//! HS256 credential signing with `jsonwebtoken`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::domain::ports::{CredentialSigner, CredentialSignerError};
use crate::domain::{Credential, CredentialClaims, DisplayName, UserId};

/// Issuer written to and required on every credential.
pub const DEFAULT_ISSUER: &str = "listings";

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: String,
    name: String,
    iat: i64,
    exp: i64,
    iss: String,
}

/// [`CredentialSigner`] producing HS256 JSON Web Tokens.
#[derive(Clone)]
pub struct JwtCredentialSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtCredentialSigner {
    /// Build a signer from raw secret bytes. The caller's copy of the secret
    /// may be zeroized once this returns.
    pub fn new(secret: &[u8], issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
        }
    }

    /// Build a signer and wipe `secret` afterwards.
    pub fn from_owned_secret(mut secret: Vec<u8>, issuer: impl Into<String>) -> Self {
        let signer = Self::new(&secret, issuer);
        secret.zeroize();
        signer
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation
    }
}

fn timestamp(seconds: i64, claim: &str) -> Result<DateTime<Utc>, CredentialSignerError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| CredentialSignerError::invalid(format!("{claim} out of range")))
}

#[async_trait]
impl CredentialSigner for JwtCredentialSigner {
    async fn sign(&self, claims: &CredentialClaims) -> Result<Credential, CredentialSignerError> {
        let payload = JwtClaims {
            sub: claims.subject.to_string(),
            name: claims.display_name.to_string(),
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|err| CredentialSignerError::signing(err.to_string()))?;
        Credential::new(token).ok_or_else(|| CredentialSignerError::signing("empty token"))
    }

    async fn verify_signature(
        &self,
        credential: &Credential,
    ) -> Result<CredentialClaims, CredentialSignerError> {
        let data = decode::<JwtClaims>(credential.as_str(), &self.decoding_key, &self.validation())
            .map_err(|err| CredentialSignerError::invalid(err.to_string()))?;
        let claims = data.claims;
        Ok(CredentialClaims {
            subject: UserId::new(&claims.sub)
                .map_err(|err| CredentialSignerError::invalid(format!("sub: {err}")))?,
            display_name: DisplayName::new(claims.name)
                .map_err(|err| CredentialSignerError::invalid(format!("name: {err}")))?,
            issued_at: timestamp(claims.iat, "iat")?,
            expires_at: timestamp(claims.exp, "exp")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, SubsecRound};
    use rstest::{fixture, rstest};

    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[fixture]
    fn signer() -> JwtCredentialSigner {
        JwtCredentialSigner::new(SECRET, DEFAULT_ISSUER)
    }

    fn claims(expires_in: Duration) -> CredentialClaims {
        let now = Utc::now().trunc_subsecs(0);
        CredentialClaims {
            subject: UserId::random(),
            display_name: DisplayName::new("Ada").expect("valid name"),
            issued_at: now,
            expires_at: now + expires_in,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn signed_claims_verify(signer: JwtCredentialSigner) {
        let original = claims(Duration::hours(1));
        let credential = signer.sign(&original).await.expect("signed");

        let verified = signer
            .verify_signature(&credential)
            .await
            .expect("verified");
        assert_eq!(verified, original);
    }

    #[rstest]
    #[tokio::test]
    async fn expired_credential_is_invalid(signer: JwtCredentialSigner) {
        let credential = signer
            .sign(&claims(Duration::hours(-2)))
            .await
            .expect("signed");

        let err = signer
            .verify_signature(&credential)
            .await
            .expect_err("expired");
        assert!(matches!(err, CredentialSignerError::Invalid { .. }));
    }

    #[rstest]
    #[case(JwtCredentialSigner::new(b"another-secret-another-secret-00", DEFAULT_ISSUER))]
    #[case(JwtCredentialSigner::new(SECRET, "someone-else"))]
    #[tokio::test]
    async fn foreign_credentials_are_invalid(
        signer: JwtCredentialSigner,
        #[case] foreign: JwtCredentialSigner,
    ) {
        let credential = foreign
            .sign(&claims(Duration::hours(1)))
            .await
            .expect("signed");

        let err = signer
            .verify_signature(&credential)
            .await
            .expect_err("foreign");
        assert!(matches!(err, CredentialSignerError::Invalid { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn garbage_is_invalid(signer: JwtCredentialSigner) {
        let credential = Credential::new("not.a.jwt").expect("non-blank");
        assert!(signer.verify_signature(&credential).await.is_err());
    }
}
