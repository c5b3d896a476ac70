use thiserror::Error;

use crate::domain::foundation::ErrorCode;

/// Why a credential failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TokenError {
    #[error("credential is empty")]
    EmptyCredential,

    #[error("signature does not match")]
    BadSignature,

    #[error("credential is not a well-formed JWT")]
    Malformed,

    #[error("credential uses an unsupported algorithm or format")]
    Unsupported,

    #[error("claims could not be decoded or the key is unusable")]
    InvalidClaims,

    #[error("credential kind does not match the expected kind")]
    WrongKind,

    #[error("credential has expired")]
    Expired,
}

impl TokenError {
    /// Response code for this failure when it reaches the entry point.
    pub fn code(&self) -> ErrorCode {
        match self {
            TokenError::EmptyCredential => ErrorCode::UnknownToken,
            TokenError::BadSignature => ErrorCode::WrongSignatureToken,
            TokenError::Malformed => ErrorCode::MalformedToken,
            TokenError::Unsupported => ErrorCode::UnsupportedToken,
            TokenError::InvalidClaims => ErrorCode::InvalidClaimsToken,
            TokenError::WrongKind => ErrorCode::InvalidTypeToken,
            TokenError::Expired => ErrorCode::ExpiredToken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_failure_maps_to_wrong_signature() {
        assert_eq!(TokenError::BadSignature.code(), ErrorCode::WrongSignatureToken);
        assert_eq!(TokenError::EmptyCredential.code(), ErrorCode::UnknownToken);
    }
}
