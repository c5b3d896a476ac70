//! HS512 implementation of the `TokenCodec` port.
//!
//! Verification order is fixed:
//!
//! 1. Structure and header (`Malformed`, `Unsupported`)
//! 2. Signature (`BadSignature`)
//! 3. Claims decoding and issuer (`InvalidClaims`)
//! 4. Kind (`WrongKind`)
//! 5. Expiry against the supplied clock (`Expired`)
//!
//! `jsonwebtoken`'s own expiry check is disabled so that expiry is always
//! judged last and without leeway.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::config::{AuthConfig, MIN_SIGNING_KEY_BYTES};
use crate::domain::auth::{Claims, TokenError, TokenKind};
use crate::domain::foundation::Timestamp;
use crate::ports::TokenCodec;

const ALGORITHM: Algorithm = Algorithm::HS512;

/// Signs and verifies credentials with a shared HMAC-SHA-512 key.
pub struct HmacTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    unchecked: Validation,
}

impl HmacTokenCodec {
    /// Build a codec for `issuer` keyed by `signing_key`.
    ///
    /// # Errors
    ///
    /// `InvalidClaims` if the key is shorter than 64 bytes.
    pub fn new(issuer: impl Into<String>, signing_key: &SecretString) -> Result<Self, TokenError> {
        let issuer = issuer.into();
        let secret = signing_key.expose_secret().as_bytes();
        if secret.len() < MIN_SIGNING_KEY_BYTES {
            tracing::error!(
                key_len = secret.len(),
                "Signing key too weak for HS512"
            );
            return Err(TokenError::InvalidClaims);
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let mut unchecked = Validation::new(ALGORITHM);
        unchecked.insecure_disable_signature_validation();
        unchecked.validate_exp = false;
        unchecked.set_required_spec_claims::<&str>(&[]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            unchecked,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        Self::new(config.issuer.clone(), &config.signing_key)
    }
}

impl TokenCodec for HmacTokenCodec {
    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign credential: {}", e);
            map_error_kind(e.kind())
        })
    }

    fn verify_at(
        &self,
        credential: &str,
        expected: TokenKind,
        now: Timestamp,
    ) -> Result<Claims, TokenError> {
        if credential.trim().is_empty() {
            return Err(TokenError::EmptyCredential);
        }

        let claims = decode::<Claims>(credential, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let mapped = map_error_kind(e.kind());
                match mapped {
                    TokenError::BadSignature => tracing::warn!("Credential signature mismatch"),
                    _ => tracing::debug!(error = %e, "Credential rejected"),
                }
                mapped
            })?;

        if claims.kind != expected {
            tracing::warn!(
                user_id = %claims.id,
                expected = %expected,
                actual = %claims.kind,
                "Credential kind mismatch"
            );
            return Err(TokenError::WrongKind);
        }

        if claims.is_expired_at(now) {
            tracing::debug!(user_id = %claims.id, kind = %claims.kind, "Credential expired");
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn parse_unchecked(&self, credential: &str) -> Result<Claims, TokenError> {
        if credential.trim().is_empty() {
            return Err(TokenError::EmptyCredential);
        }
        decode::<Claims>(credential, &self.decoding_key, &self.unchecked)
            .map(|data| data.claims)
            .map_err(|e| map_error_kind(e.kind()))
    }
}

fn map_error_kind(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidToken => TokenError::Malformed,
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => TokenError::Unsupported,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::InvalidClaims,
    }
}

impl std::fmt::Debug for HmacTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacTokenCodec")
            .field("issuer", &self.validation.iss)
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}
