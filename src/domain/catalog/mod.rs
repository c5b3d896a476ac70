//! Live catalog domain: broadcast channels, cached product trees and
//! view-count events.

mod channel;
mod product_tree;
mod view_count;

pub use channel::{ChannelName, ChannelSet, SNAPSHOT_TTL_SECS};
pub use product_tree::{ProductEntry, ProductTree, ShopEntry};
pub use view_count::{ViewCountMap, ViewCountUpdate};
