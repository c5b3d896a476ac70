//! Redis configuration (view counters, snapshots, membership, pub/sub)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::catalog::ChannelName;

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Broadcast channels known at deployment time (comma-separated)
    #[serde(default = "default_channels")]
    pub channels: String,
}

impl RedisConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parsed channel list. Entries that fail validation are skipped;
    /// `validate` reports them.
    pub fn channel_names(&self) -> Vec<ChannelName> {
        self.channels
            .split(',')
            .filter_map(|raw| ChannelName::new(raw).ok())
            .collect()
    }

    /// Validate Redis configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        for raw in self.channels.split(',') {
            ChannelName::new(raw)
                .map_err(|_| ValidationError::InvalidChannel(raw.trim().to_string()))?;
        }
        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout(),
            channels: default_channels(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}

fn default_channels() -> String {
    "apm,chung,dong,jeil".to_string()
}
