use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Fixed lifetime of a cached product tree snapshot.
pub const SNAPSHOT_TTL_SECS: u64 = 300;

const MAX_LEN: usize = 32;

/// Name of a broadcast group (one per mall).
///
/// The same name keys the snapshot, the view-count hash, the membership list,
/// the broker channel and the socket topic. A leading `/` is accepted and
/// stripped so topic paths parse to the same channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelName(String);

impl ChannelName {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let name = raw.trim().trim_start_matches('/');
        if name.is_empty() {
            return Err(ValidationError::empty_field("channel"));
        }
        if name.len() > MAX_LEN {
            return Err(ValidationError::invalid_format(
                "channel",
                format!("longer than {} characters", MAX_LEN),
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            return Err(ValidationError::invalid_format(
                "channel",
                "only lowercase letters, digits, '_' and '-' are allowed",
            ));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Socket topic path, e.g. `/apm`.
    pub fn topic(&self) -> String {
        format!("/{}", self.0)
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChannelName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ChannelName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ChannelName> for String {
    fn from(value: ChannelName) -> Self {
        value.0
    }
}

/// Channels configured for this deployment. Anything else is refused before
/// it can create keys or topics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelSet(BTreeSet<ChannelName>);

impl ChannelSet {
    pub fn new(channels: impl IntoIterator<Item = ChannelName>) -> Self {
        Self(channels.into_iter().collect())
    }

    pub fn contains(&self, channel: &ChannelName) -> bool {
        self.0.contains(channel)
    }

    /// Parse `raw` and require it to be a configured channel.
    pub fn resolve(&self, raw: &str) -> Result<ChannelName, ValidationError> {
        let channel = ChannelName::new(raw)?;
        if !self.contains(&channel) {
            return Err(ValidationError::invalid_format(
                "channel",
                format!("'{}' is not a configured channel", channel),
            ));
        }
        Ok(channel)
    }

    pub fn to_vec(&self) -> Vec<ChannelName> {
        self.0.iter().cloned().collect()
    }
}
