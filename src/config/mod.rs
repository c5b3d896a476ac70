//! Application configuration module
//!
//! Configuration is read from environment variables with the `MARKET_LIVE`
//! prefix; nested values are separated by a double underscore.
//!
//! # Example
//!
//! ```no_run
//! use market_live::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod redis;
mod server;

pub use auth::{AuthConfig, MIN_SIGNING_KEY_BYTES};
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Listener, environment and CORS
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL session store
    pub database: DatabaseConfig,

    /// Redis cache, membership lists and pub/sub
    pub redis: RedisConfig,

    /// Credential signing and lifetimes
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `MARKET_LIVE__SERVER__BIND_ADDR=0.0.0.0:8080` -> `server.bind_addr`
    /// - `MARKET_LIVE__AUTH__SIGNING_KEY=...` -> `auth.signing_key = ...`
    ///
    /// A `.env` file is honoured when present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("MARKET_LIVE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.auth.validate(&self.server.environment)?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn set_minimal_env() {
        env::set_var("MARKET_LIVE__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("MARKET_LIVE__REDIS__URL", "redis://localhost:6379");
        env::set_var("MARKET_LIVE__AUTH__SIGNING_KEY", KEY);
    }

    fn clear_env() {
        for var in [
            "MARKET_LIVE__DATABASE__URL",
            "MARKET_LIVE__REDIS__URL",
            "MARKET_LIVE__REDIS__CHANNELS",
            "MARKET_LIVE__AUTH__SIGNING_KEY",
            "MARKET_LIVE__AUTH__ACCESS_TTL_SECS",
            "MARKET_LIVE__SERVER__BIND_ADDR",
            "MARKET_LIVE__SERVER__ENVIRONMENT",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn loads_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.redis.url, "redis://localhost:6379");
        assert_eq!(config.auth.refresh_cookie_name, "refresh_token");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_nested_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("MARKET_LIVE__SERVER__BIND_ADDR", "3000");
        env::set_var("MARKET_LIVE__AUTH__ACCESS_TTL_SECS", "60");
        env::set_var("MARKET_LIVE__REDIS__CHANNELS", "apm,dong");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.socket_addr().unwrap().port(), 3000);
        assert_eq!(config.auth.access_ttl_secs, 60);
        assert_eq!(config.redis.channel_names().len(), 2);
    }

    #[test]
    fn production_flag_follows_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("MARKET_LIVE__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn missing_signing_key_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::remove_var("MARKET_LIVE__AUTH__SIGNING_KEY");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_err());
    }
}
