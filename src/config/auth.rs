//! Credential configuration (HS512 signing key, lifetimes, refresh cookie)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum HMAC key length for HS512.
pub const MIN_SIGNING_KEY_BYTES: usize = 64;

/// Authentication configuration
///
/// Built once at startup and handed to the token codec and credential
/// service by value. Nothing reads it from a global.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// `iss` claim written into every credential
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Shared HMAC key
    pub signing_key: SecretString,

    /// Access credential lifetime in seconds
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: u64,

    /// Refresh credential lifetime in seconds, also the cookie `Max-Age`
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: u64,

    /// Name of the HTTP-only refresh cookie
    #[serde(default = "default_refresh_cookie")]
    pub refresh_cookie_name: String,

    /// Mark the refresh cookie `Secure`. Only disabled for plain-HTTP local runs.
    #[serde(default = "default_secure_cookie")]
    pub secure_cookie: bool,
}

impl AuthConfig {
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_secs)
    }

    /// Validate authentication configuration
    ///
    /// Production always requires a `Secure` cookie.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.issuer.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__ISSUER"));
        }
        let key = self.signing_key.expose_secret();
        if key.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__SIGNING_KEY"));
        }
        if key.len() < MIN_SIGNING_KEY_BYTES {
            return Err(ValidationError::WeakSigningKey(MIN_SIGNING_KEY_BYTES));
        }
        if self.access_ttl_secs == 0 {
            return Err(ValidationError::InvalidLifetime("access_ttl_secs"));
        }
        if self.refresh_ttl_secs == 0 {
            return Err(ValidationError::InvalidLifetime("refresh_ttl_secs"));
        }
        if self.access_ttl_secs >= self.refresh_ttl_secs {
            return Err(ValidationError::AccessOutlivesRefresh);
        }
        if self.refresh_cookie_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__REFRESH_COOKIE_NAME"));
        }
        if *environment == Environment::Production && !self.secure_cookie {
            return Err(ValidationError::MissingRequired("AUTH__SECURE_COOKIE"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("issuer", &self.issuer)
            .field("signing_key", &"[REDACTED]")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("refresh_cookie_name", &self.refresh_cookie_name)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            signing_key: SecretString::new(String::new()),
            access_ttl_secs: default_access_ttl(),
            refresh_ttl_secs: default_refresh_ttl(),
            refresh_cookie_name: default_refresh_cookie(),
            secure_cookie: default_secure_cookie(),
        }
    }
}

fn default_issuer() -> String {
    "market-live".to_string()
}

fn default_access_ttl() -> u64 {
    30 * 60
}

fn default_refresh_ttl() -> u64 {
    14 * 24 * 60 * 60
}

fn default_refresh_cookie() -> String {
    "refresh_token".to_string()
}

fn default_secure_cookie() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_key(len: usize) -> AuthConfig {
        AuthConfig {
            signing_key: SecretString::new("k".repeat(len)),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_are_thirty_minutes_and_two_weeks() {
        let config = AuthConfig::default();
        assert_eq!(config.access_ttl(), Duration::from_secs(1800));
        assert_eq!(config.refresh_ttl(), Duration::from_secs(1_209_600));
        assert_eq!(config.refresh_cookie_name, "refresh_token");
    }

    #[test]
    fn short_signing_key_is_weak() {
        assert!(matches!(
            with_key(32).validate(&Environment::Development),
            Err(ValidationError::WeakSigningKey(64))
        ));
        assert!(with_key(64).validate(&Environment::Development).is_ok());
    }

    #[test]
    fn missing_signing_key_is_required() {
        assert!(matches!(
            AuthConfig::default().validate(&Environment::Development),
            Err(ValidationError::MissingRequired("AUTH__SIGNING_KEY"))
        ));
    }

    #[test]
    fn access_must_expire_before_refresh() {
        let config = AuthConfig {
            access_ttl_secs: 100,
            refresh_ttl_secs: 100,
            ..with_key(64)
        };
        assert!(matches!(
            config.validate(&Environment::Development),
            Err(ValidationError::AccessOutlivesRefresh)
        ));
    }

    #[test]
    fn production_requires_secure_cookie() {
        let config = AuthConfig {
            secure_cookie: false,
            ..with_key(64)
        };
        assert!(config.validate(&Environment::Development).is_ok());
        assert!(config.validate(&Environment::Production).is_err());
    }

    #[test]
    fn debug_output_redacts_signing_key() {
        let rendered = format!("{:?}", with_key(64));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("kkkk"));
    }
}
