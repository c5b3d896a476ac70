//! CredentialService - issues and rotates credential pairs.

use std::sync::Arc;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::domain::auth::{Claims, Principal, TokenError, TokenKind};
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{SessionStore, TokenCodec};

/// Issuer and lifetimes, fixed at construction.
#[derive(Debug, Clone)]
pub struct CredentialSettings {
    pub issuer: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

impl From<&AuthConfig> for CredentialSettings {
    fn from(config: &AuthConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
        }
    }
}

/// A freshly issued access/refresh pair.
///
/// The access credential travels in the response body, the refresh
/// credential in the HTTP-only cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    #[error("Failed to sign credential: {0}")]
    Signing(#[from] TokenError),

    #[error("Failed to persist refresh credential: {0}")]
    Store(#[from] DomainError),
}

pub struct CredentialService {
    codec: Arc<dyn TokenCodec>,
    store: Arc<dyn SessionStore>,
    settings: CredentialSettings,
}

impl CredentialService {
    pub fn new(
        codec: Arc<dyn TokenCodec>,
        store: Arc<dyn SessionStore>,
        settings: CredentialSettings,
    ) -> Self {
        Self {
            codec,
            store,
            settings,
        }
    }

    pub fn codec(&self) -> &dyn TokenCodec {
        self.codec.as_ref()
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    /// Short-lived credential. Never persisted.
    pub fn issue_access(&self, principal: &Principal) -> Result<String, CredentialError> {
        self.sign(principal, TokenKind::Access, self.settings.access_ttl_secs)
    }

    /// Long-lived credential, stored as the user's only valid refresh value.
    ///
    /// This is the rotation point: whatever was stored before becomes a replay.
    pub async fn issue_refresh_and_persist(
        &self,
        principal: &Principal,
    ) -> Result<String, CredentialError> {
        let refresh = self.sign(principal, TokenKind::Refresh, self.settings.refresh_ttl_secs)?;
        self.store.upsert(principal.id, &refresh).await?;
        tracing::info!(user_id = %principal.id, "Refresh credential rotated");
        Ok(refresh)
    }

    pub async fn rotate(&self, principal: &Principal) -> Result<CredentialPair, CredentialError> {
        let access_token = self.issue_access(principal)?;
        let refresh_token = self.issue_refresh_and_persist(principal).await?;
        Ok(CredentialPair {
            access_token,
            refresh_token,
        })
    }

    fn sign(
        &self,
        principal: &Principal,
        kind: TokenKind,
        ttl_secs: u64,
    ) -> Result<String, CredentialError> {
        let claims = Claims::for_principal(
            principal,
            kind,
            &self.settings.issuer,
            Timestamp::now(),
            ttl_secs,
        );
        Ok(self.codec.sign(&claims)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySessionStore;
    use crate::adapters::token::HmacTokenCodec;
    use crate::domain::auth::Role;
    use crate::domain::foundation::UserId;
    use secrecy::SecretString;

    fn service() -> (CredentialService, Arc<InMemorySessionStore>) {
        let codec = HmacTokenCodec::new("market-live", &SecretString::new("s".repeat(64))).unwrap();
        let store = Arc::new(InMemorySessionStore::new());
        let service = CredentialService::new(
            Arc::new(codec),
            store.clone(),
            CredentialSettings {
                issuer: "market-live".into(),
                access_ttl_secs: 1_800,
                refresh_ttl_secs: 1_209_600,
            },
        );
        (service, store)
    }

    fn principal() -> Principal {
        Principal::new(UserId::new(7), Role::Retailer, "Park", "park@example.com")
    }

    #[test]
    fn access_credential_verifies_until_ttl() {
        let (service, _) = service();
        let token = service.issue_access(&principal()).unwrap();
        let claims = service.codec().verify(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.principal(), principal());
        let just_before = Timestamp::from_unix_secs(claims.exp - 1);
        let at_expiry = Timestamp::from_unix_secs(claims.exp);
        assert!(service
            .codec()
            .verify_at(&token, TokenKind::Access, just_before)
            .is_ok());
        assert_eq!(
            service.codec().verify_at(&token, TokenKind::Access, at_expiry),
            Err(TokenError::Expired)
        );
        assert_eq!(claims.exp - claims.iat, 1_800);
    }

    #[tokio::test]
    async fn access_credentials_are_not_persisted() {
        let (service, store) = service();
        service.issue_access(&principal()).unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn rotation_replaces_stored_refresh_credential() {
        let (service, store) = service();
        let first = service.rotate(&principal()).await.unwrap();
        let second = service.rotate(&principal()).await.unwrap();

        assert_ne!(first.refresh_token, second.refresh_token);
        let record = store.find(UserId::new(7)).await.unwrap().unwrap();
        assert!(record.matches(&second.refresh_token));
        assert!(!record.matches(&first.refresh_token));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_store_error() {
        let (service, store) = service();
        store.fail_writes(true);

        let result = service.issue_refresh_and_persist(&principal()).await;
        assert!(matches!(result, Err(CredentialError::Store(_))));
    }
}
