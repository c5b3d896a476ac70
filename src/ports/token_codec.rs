//! TokenCodec port - compact signed bearer credentials.

use crate::domain::auth::{Claims, TokenError, TokenKind};
use crate::domain::foundation::Timestamp;

/// Signs and verifies credentials.
///
/// Verification returns a typed outcome; it never panics on hostile input.
/// The signing key is fixed at construction.
pub trait TokenCodec: Send + Sync {
    /// Sign `claims`. The expiry is taken from `claims.exp`.
    fn sign(&self, claims: &Claims) -> Result<String, TokenError>;

    /// Verify signature, structure and kind, then expiry against `now`.
    ///
    /// Expiry is checked last: a tampered expired credential reports
    /// `BadSignature`, an untampered one `Expired`.
    fn verify_at(
        &self,
        credential: &str,
        expected: TokenKind,
        now: Timestamp,
    ) -> Result<Claims, TokenError>;

    /// Verify against the current wall clock.
    fn verify(&self, credential: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        self.verify_at(credential, expected, Timestamp::now())
    }

    /// Decode claims without checking the signature or expiry.
    ///
    /// Only call this on a credential that `verify` accepted earlier in the
    /// same flow.
    fn parse_unchecked(&self, credential: &str) -> Result<Claims, TokenError>;
}
