//! AuthGate - the per-request filter, failure entry point and logout flow.
//!
//! Transport-free: the axum middleware feeds it header and cookie values and
//! renders whatever it returns.

use std::sync::Arc;

use super::credential_service::CredentialService;
use crate::domain::auth::{GateOutcome, GateState, LogoutOutcome, Principal, TokenError, TokenKind};
use crate::domain::foundation::ErrorCode;

const BEARER_PREFIX: &str = "Bearer ";

/// What the per-request filter found on the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterResult {
    Authenticated(Principal),
    /// Verification failed; the marker is consumed by the entry point.
    Failed(TokenError),
    /// No bearer credential was presented.
    Anonymous,
}

pub struct AuthGate {
    credentials: Arc<CredentialService>,
}

impl AuthGate {
    pub fn new(credentials: Arc<CredentialService>) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &CredentialService {
        &self.credentials
    }

    /// Verify the `Authorization` header value, if any.
    ///
    /// A header without the `Bearer ` prefix counts as no credential.
    pub fn filter(&self, authorization: Option<&str>) -> FilterResult {
        let Some(token) = authorization.and_then(|value| value.strip_prefix(BEARER_PREFIX)) else {
            return FilterResult::Anonymous;
        };

        match self.credentials.codec().verify(token, TokenKind::Access) {
            Ok(claims) => FilterResult::Authenticated(claims.principal()),
            Err(err) => FilterResult::Failed(err),
        }
    }

    /// Entry point, run when authorization rejected the request.
    pub async fn commence(
        &self,
        marker: Option<TokenError>,
        refresh_cookie: Option<&str>,
    ) -> GateOutcome {
        match GateState::from_marker(marker) {
            GateState::NoError => GateOutcome::Rejected(ErrorCode::UnknownError),
            GateState::OtherError(code) => GateOutcome::Rejected(code),
            GateState::ExpiredAccess => self.refresh(refresh_cookie).await,
        }
    }

    async fn refresh(&self, refresh_cookie: Option<&str>) -> GateOutcome {
        let presented = refresh_cookie.unwrap_or_default();
        let codec = self.credentials.codec();

        if let Err(err) = codec.verify(presented, TokenKind::Refresh) {
            tracing::debug!(error = %err, "Refresh credential rejected");
            return GateOutcome::Rejected(ErrorCode::MalformedRefreshToken);
        }

        // verified on the line above
        let claims = match codec.parse_unchecked(presented) {
            Ok(claims) => claims,
            Err(_) => return GateOutcome::Rejected(ErrorCode::MalformedRefreshToken),
        };

        let stored = match self.credentials.store().find(claims.id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!(user_id = %claims.id, "Refresh credential has no stored session");
                return GateOutcome::Rejected(ErrorCode::MalformedRefreshToken);
            }
            Err(err) => {
                tracing::error!(user_id = %claims.id, "Session lookup failed: {}", err);
                return GateOutcome::Rejected(ErrorCode::UnknownError);
            }
        };

        if !stored.matches(presented) {
            tracing::warn!(user_id = %claims.id, "Refresh credential replayed");
            return GateOutcome::Rejected(ErrorCode::UsedRefreshToken);
        }

        match self.credentials.rotate(&claims.principal()).await {
            Ok(pair) => GateOutcome::Reissued {
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
            Err(err) => {
                tracing::error!(user_id = %claims.id, "Credential rotation failed: {}", err);
                GateOutcome::Rejected(ErrorCode::UnknownError)
            }
        }
    }

    /// Invalidate the stored refresh credential matching the cookie.
    ///
    /// The caller clears the cookie whatever the outcome.
    pub async fn logout(&self, refresh_cookie: Option<&str>) -> LogoutOutcome {
        let presented = refresh_cookie.unwrap_or_default();
        let codec = self.credentials.codec();

        if codec.verify(presented, TokenKind::Refresh).is_err() {
            return LogoutOutcome::Failed(ErrorCode::LogoutFailMalformedToken);
        }

        // verified on the line above
        let Ok(claims) = codec.parse_unchecked(presented) else {
            return LogoutOutcome::Failed(ErrorCode::LogoutFailMalformedToken);
        };

        let store = self.credentials.store();
        match store.find(claims.id).await {
            Ok(Some(record)) if record.matches(presented) => {}
            Ok(_) => return LogoutOutcome::Failed(ErrorCode::LogoutFailMalformedToken),
            Err(err) => {
                tracing::error!(user_id = %claims.id, "Session lookup failed: {}", err);
                return LogoutOutcome::Failed(ErrorCode::LogoutFailDbError);
            }
        }

        if let Err(err) = store.delete(claims.id).await {
            tracing::error!(
                user_id = %claims.id,
                "Failed to delete refresh credential: {}",
                err
            );
            return LogoutOutcome::Failed(ErrorCode::LogoutFailDbError);
        }

        tracing::info!(user_id = %claims.id, "Refresh credential removed on logout");
        LogoutOutcome::LoggedOut
    }
}
