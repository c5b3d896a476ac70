//! Shared state handed to every handler and middleware.

use std::sync::Arc;

use super::cookies::RefreshCookie;
use crate::adapters::websocket::TopicHub;
use crate::application::{AuthGate, ViewCountService};
use crate::domain::catalog::ChannelSet;
use crate::ports::MembershipRegistry;

/// Cloned per request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AuthGate>,
    pub view_counts: Arc<ViewCountService>,
    pub membership: Arc<dyn MembershipRegistry>,
    pub topics: Arc<TopicHub>,
    /// Every channel name from a client is resolved against this set.
    pub channels: Arc<ChannelSet>,
    pub refresh_cookie: RefreshCookie,
}
