//! Keyspace shared with the scheduler and other nodes.

use crate::domain::catalog::ChannelName;

pub fn snapshot_key(channel: &ChannelName) -> String {
    format!("snapshot:{}", channel)
}

pub fn view_count_key(channel: &ChannelName) -> String {
    format!("view_count:{}", channel)
}

pub fn membership_key(channel: &ChannelName) -> String {
    format!("membership:{}", channel)
}
