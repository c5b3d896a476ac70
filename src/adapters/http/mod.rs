//! HTTP adapter - axum router, middleware and handlers.
//!
//! ```text
//! /api/main/...        snapshot + view-count endpoints
//! /api/socket/...      membership leave
//! /api/logout          intercepted by logout_filter
//! /ws                  STOMP upgrade (bypasses auth_filter)
//! ```

pub mod auth;
pub mod cookies;
pub mod main_page;
pub mod middleware;
pub mod response;
pub mod router;
pub mod socket;
pub mod state;

pub use auth::login_success;
pub use cookies::RefreshCookie;
pub use response::{ApiError, ApiResponse};
pub use router::{api_router, build_router};
pub use state::AppState;
