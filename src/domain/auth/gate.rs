//! States of the authentication gate.
//!
//! The per-request filter verifies the access credential and leaves either a
//! principal or a failure marker on the request. When downstream
//! authorization rejects the request the entry point classifies the marker
//! into a [`GateState`] and drives it to a terminal [`GateOutcome`].

use super::token_error::TokenError;
use crate::domain::foundation::ErrorCode;

/// Classification of the marker left by the per-request filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Nothing was attached; authorization failed for another reason.
    NoError,
    /// The access credential expired; the refresh flow may recover it.
    ExpiredAccess,
    /// Any other verification failure, already mapped to its response code.
    OtherError(ErrorCode),
}

impl GateState {
    pub fn from_marker(marker: Option<TokenError>) -> Self {
        match marker {
            None => GateState::NoError,
            Some(TokenError::Expired) => GateState::ExpiredAccess,
            Some(other) => GateState::OtherError(other.code()),
        }
    }
}

/// Terminal response of the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The refresh flow rotated the session. The new access credential goes
    /// in the body, the refresh credential in the cookie.
    Reissued {
        access_token: String,
        refresh_token: String,
    },
    Rejected(ErrorCode),
}

impl GateOutcome {
    /// Response code carried in the envelope.
    pub fn code(&self) -> ErrorCode {
        match self {
            GateOutcome::Reissued { .. } => ErrorCode::TokenReissued,
            GateOutcome::Rejected(code) => *code,
        }
    }
}

/// Result of the logout filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    Failed(ErrorCode),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_marker_is_no_error() {
        assert_eq!(GateState::from_marker(None), GateState::NoError);
    }

    #[test]
    fn expiry_enters_refresh_flow() {
        assert_eq!(
            GateState::from_marker(Some(TokenError::Expired)),
            GateState::ExpiredAccess
        );
    }

    #[test]
    fn other_failures_carry_their_code() {
        assert_eq!(
            GateState::from_marker(Some(TokenError::Malformed)),
            GateState::OtherError(ErrorCode::MalformedToken)
        );
    }

    #[test]
    fn reissued_outcome_uses_reissue_code() {
        let outcome = GateOutcome::Reissued {
            access_token: "a".into(),
            refresh_token: "r".into(),
        };
        assert_eq!(outcome.code(), ErrorCode::TokenReissued);
    }
}
