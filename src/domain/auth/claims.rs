//! Claims carried inside a signed credential.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::principal::{Principal, Role};
use crate::domain::foundation::{Timestamp, UserId};

/// Credential kind, checked explicitly on every verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("ACCESS"),
            TokenKind::Refresh => f.write_str("REFRESH"),
        }
    }
}

/// JWT payload: `{iss, iat, exp, sub, jti, kind, id, name, role}`.
///
/// `sub` holds the principal's email. Times are Unix seconds. `jti` is random
/// per credential, so two credentials issued for one user in the same second
/// still differ and rotation always invalidates the previous refresh value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub sub: String,
    pub jti: String,
    pub kind: TokenKind,
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

impl Claims {
    /// Claims for `principal`, issued at `issued_at` and valid for `ttl_secs`.
    pub fn for_principal(
        principal: &Principal,
        kind: TokenKind,
        issuer: &str,
        issued_at: Timestamp,
        ttl_secs: u64,
    ) -> Self {
        Self {
            iss: issuer.to_string(),
            iat: issued_at.as_unix_secs(),
            exp: issued_at.plus_secs(ttl_secs).as_unix_secs(),
            sub: principal.email.clone(),
            jti: Uuid::new_v4().to_string(),
            kind,
            id: principal.id,
            name: principal.name.clone(),
            role: principal.role,
        }
    }

    /// Rebuilds the principal the claims were issued for.
    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.role, self.name.clone(), self.sub.clone())
    }

    /// True when the expiry is at or before `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.exp <= now.as_unix_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Principal {
        Principal::new(UserId::new(7), Role::Retailer, "Kim", "kim@example.com")
    }

    #[test]
    fn subject_is_the_email() {
        let claims = Claims::for_principal(
            &principal(),
            TokenKind::Access,
            "market-live",
            Timestamp::from_unix_secs(1_000),
            60,
        );
        assert_eq!(claims.sub, "kim@example.com");
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 1_060);
        assert_eq!(claims.principal(), principal());
    }

    #[test]
    fn expiry_boundary_counts_as_expired() {
        let claims = Claims::for_principal(
            &principal(),
            TokenKind::Refresh,
            "market-live",
            Timestamp::from_unix_secs(1_000),
            60,
        );
        assert!(!claims.is_expired_at(Timestamp::from_unix_secs(1_059)));
        assert!(claims.is_expired_at(Timestamp::from_unix_secs(1_060)));
    }

    #[test]
    fn same_second_claims_differ_by_id() {
        let at = Timestamp::from_unix_secs(1_000);
        let a = Claims::for_principal(&principal(), TokenKind::Refresh, "market-live", at, 60);
        let b = Claims::for_principal(&principal(), TokenKind::Refresh, "market-live", at, 60);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn kind_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&TokenKind::Refresh).unwrap(), "\"REFRESH\"");
    }
}
