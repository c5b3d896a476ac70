//! MembershipRegistry port - users attached to each broadcast channel.

use async_trait::async_trait;

use super::CacheError;
use crate::domain::catalog::ChannelName;
use crate::domain::foundation::UserId;

/// Ordered per-channel list of user ids (`membership:<channel>`).
///
/// Each live connection owns one entry, so a user with two open sockets is
/// listed twice until both close.
#[async_trait]
pub trait MembershipRegistry: Send + Sync {
    /// Append one entry for the user.
    async fn join(&self, channel: &ChannelName, user: UserId) -> Result<(), CacheError>;

    /// Remove the first occurrence of the user. Returns whether one was removed.
    async fn leave(&self, channel: &ChannelName, user: UserId) -> Result<bool, CacheError>;

    /// Members in join order.
    async fn list(&self, channel: &ChannelName) -> Result<Vec<UserId>, CacheError>;
}
